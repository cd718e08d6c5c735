use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use config::Config;
use keycloak::TokenProvider;
use once_cell::sync::Lazy;
use reqwest::Client;
use todo::{seed_and_list, AuthenticatedRequester, Summary};
use tracing::{error, info, Level};

mod config;
mod keycloak;
mod todo;

pub static CONFIG: Lazy<Config> = Lazy::new(Config::parse);

pub static CLIENT: Lazy<Client> = Lazy::new(Client::new);

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(if CONFIG.verbose { Level::DEBUG } else { Level::INFO })
        .init();
    match run(&CONFIG, CLIENT.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, client: Client) -> anyhow::Result<()> {
    let profile = config.identity()?;
    let credentials = config.credentials(profile);
    println!("{}", credentials.username);

    let mut tokens = TokenProvider::new(client.clone(), credentials);
    // No api calls are made without a token
    tokens
        .request_token()
        .await
        .context("Failed to authenticate with keycloak")?;

    let requester = AuthenticatedRequester::new(client, &tokens);
    let responses = seed_and_list(&requester, &config.todo_api_url, config.items).await?;
    info!(
        "Finished as {}: {}",
        tokens.credentials().username,
        Summary::from_responses(&responses)
    );
    Ok(())
}
