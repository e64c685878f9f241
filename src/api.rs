// SPDX-License-Identifier: MIT
//
// HTTP client for the Gita Bot backend: the question endpoint plus the
// register/login boundary.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

const GENERIC_FAILURE: &str = "Something went wrong.";

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
    user_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Reply shape shared by `/auth/register` and `/auth/login`.
///
/// The backend reports `success` as the string "True"/"False"; accept a
/// real boolean too in case the contract is ever fixed.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthReply {
    pub message: String,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub success: bool,
    pub user_name: Option<String>,
    pub user_id: Option<String>,
}

fn bool_or_string<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Boolish {
        Bool(bool),
        Text(String),
    }

    match Boolish::deserialize(deserializer)? {
        Boolish::Bool(b) => Ok(b),
        Boolish::Text(s) => Ok(s.eq_ignore_ascii_case("true")),
    }
}

#[derive(Clone)]
pub(crate) struct BotClient {
    client: reqwest::Client,
    base_url: String,
}

impl BotClient {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Ask the bot a question. Non-2xx replies surface the backend's
    /// `detail` message when present; 2xx bodies that fail to parse are a
    /// decode error, not a silent empty answer.
    pub(crate) async fn ask(&self, question: &str, user_id: Option<&str>) -> Result<String> {
        let url = format!("{}/bot/generate/", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AskRequest { question, user_id })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.detail.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            });
        }

        let text = response.text().await?;
        let body: AskResponse = serde_json::from_str(&text)?;
        Ok(body.response)
    }

    pub(crate) async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthReply> {
        self.auth_post(
            "/auth/register",
            serde_json::to_value(RegisterRequest { name, email, password })?,
        )
        .await
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> Result<AuthReply> {
        self.auth_post(
            "/auth/login",
            serde_json::to_value(LoginRequest { email, password })?,
        )
        .await
    }

    async fn auth_post(&self, path: &str, body: serde_json::Value) -> Result<AuthReply> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.detail.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            });
        }

        let text = response.text().await?;
        let reply: AuthReply = serde_json::from_str(&text)?;
        Ok(reply)
    }
}
