// SPDX-License-Identifier: MIT
// One-shot CLI commands: account management and single-question asks.

use colored::Colorize;
use inquire::validator::Validation;
use inquire::{Confirm, Password, PasswordDisplayMode, Text};

use crate::api::BotClient;
use crate::error::{Error, Result};
use crate::session::{self, Session};

pub(crate) async fn register(client: &BotClient) -> Result<()> {
    println!("{}", "Create a Gita Bot account".cyan().bold());

    let name = Text::new("Name:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err(Box::from("Name cannot be empty"))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .map_err(|e| Error::Prompt(e.to_string()))?;

    let email = prompt_email()?;
    let password = Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .map_err(|e| Error::Prompt(e.to_string()))?;

    let reply = client
        .register(name.trim(), email.trim(), &password)
        .await?;
    if !reply.success {
        return Err(Error::Auth(reply.message));
    }

    println!("{}", "✓ Account created. You can now log in.".green());
    Ok(())
}

pub(crate) async fn login(client: &BotClient) -> Result<()> {
    println!("{}", "Log in to Gita Bot".cyan().bold());

    let email = prompt_email()?;
    let password = Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .map_err(|e| Error::Prompt(e.to_string()))?;

    let reply = client.login(email.trim(), &password).await?;
    if !reply.success {
        return Err(Error::Auth(reply.message));
    }

    let user_id = reply
        .user_id
        .ok_or_else(|| Error::Auth("Login reply carried no user id".to_string()))?;
    let user_name = reply.user_name.unwrap_or_else(|| email.trim().to_string());

    session::save(&Session::new(user_id, user_name.clone()))?;
    println!("{}", format!("✓ Logged in as {user_name}.").green());
    Ok(())
}

pub(crate) fn logout() -> Result<()> {
    let Some(current) = session::load() else {
        println!("Not logged in.");
        return Ok(());
    };

    let confirmed = Confirm::new(&format!("Log out {}?", current.user_name))
        .with_default(true)
        .prompt()
        .map_err(|e| Error::Prompt(e.to_string()))?;
    if !confirmed {
        println!("{}", "Logout cancelled.".yellow());
        return Ok(());
    }

    session::clear()?;
    println!("{}", "✓ Logged out.".green());
    Ok(())
}

/// Ask a single question and print the answer, no TUI.
pub(crate) async fn ask(client: &BotClient, question: &str) -> Result<()> {
    let user_id = session::load().map(|s| s.user_id);
    let answer = client.ask(question, user_id.as_deref()).await?;
    println!("{answer}");
    Ok(())
}

fn prompt_email() -> Result<String> {
    Text::new("Email:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err(Box::from("Email cannot be empty"))
            } else if !input.contains('@') {
                Err(Box::from("Enter a valid email address"))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .map_err(|e| Error::Prompt(e.to_string()))
}
