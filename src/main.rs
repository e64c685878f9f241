// SPDX-License-Identifier: MIT

mod api;
mod attachment;
mod cli;
mod config;
mod error;
mod lifecycle;
mod session;
mod transcript;
mod tui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use colored::Colorize;

use api::BotClient;
use config::Config;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "gitabot")]
#[command(about = "A Bhagavad Gita question-answering chat client")]
#[command(version)]
#[command(styles = STYLES, color = clap::ColorChoice::Always)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(short, long, help = "Backend endpoint (default from config)")]
    endpoint: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a Gita Bot account
    Register,
    /// Log in and save the session
    Login,
    /// Forget the saved session
    Logout,
    /// Ask one question and print the answer
    Ask {
        #[arg(trailing_var_arg = true, required = true, help = "The question to ask")]
        question: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    let client = BotClient::new(&config.endpoint);

    let result = match args.command {
        Some(Command::Register) => cli::register(&client).await,
        Some(Command::Login) => cli::login(&client).await,
        Some(Command::Logout) => cli::logout(),
        Some(Command::Ask { question }) => cli::ask(&client, &question.join(" ")).await,
        None => tui::run(client, session::load(), &config).await,
    };

    if let Err(err) = result {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}
