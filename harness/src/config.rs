use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use reqwest::Url;

use crate::keycloak::{Credentials, KeyCloakConfig};

/// Exercises the authentication and crud behaviour of a todo api protected by keycloak
#[derive(Debug, Parser)]
pub struct Config {
    #[clap(flatten)]
    pub keycloak: KeyCloakConfig,

    /// Username of the identity that is allowed to use the todo api
    #[clap(long, env = "TODO_USERNAME", default_value = "foo")]
    pub username: String,

    /// Username of an identity without the todo role
    #[clap(long, env = "TODO_UNAUTHORISED_USERNAME", default_value = "bar")]
    pub unauthorised_username: String,

    /// Password shared by both identities
    #[clap(long, env = "TODO_PASSWORD", default_value = "password")]
    pub password: String,

    /// Identity to authenticate as. Asks on stdin if omitted
    #[clap(long, env = "IDENTITY_PROFILE", value_enum)]
    pub profile: Option<IdentityProfile>,

    /// Url of the todo items collection
    #[clap(long, env, default_value = "http://localhost:5272/api/TodoItems")]
    pub todo_api_url: Url,

    /// Number of todo items to create before listing them
    #[clap(long, env = "TODO_ITEMS", default_value_t = 9)]
    pub items: u32,

    /// Log every outgoing request
    #[clap(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn identity(&self) -> anyhow::Result<IdentityProfile> {
        match self.profile {
            Some(profile) => Ok(profile),
            None => IdentityProfile::prompt(&mut io::stdin().lock(), &mut io::stdout()),
        }
    }

    pub fn credentials(&self, profile: IdentityProfile) -> Credentials {
        let username = match profile {
            IdentityProfile::Authorised => &self.username,
            IdentityProfile::Unauthorised => &self.unauthorised_username,
        };
        Credentials::new(&self.keycloak, username, &self.password)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdentityProfile {
    Authorised,
    Unauthorised,
}

impl IdentityProfile {
    /// `0` selects the authorised identity, any other number the unauthorised one.
    pub fn from_answer(answer: &str) -> anyhow::Result<Self> {
        let answer = answer.trim();
        let choice: i64 = answer
            .parse()
            .with_context(|| format!("Expected a number but got {answer:?}"))?;
        Ok(if choice == 0 {
            Self::Authorised
        } else {
            Self::Unauthorised
        })
    }

    pub fn prompt(input: &mut impl BufRead, output: &mut impl Write) -> anyhow::Result<Self> {
        write!(output, "0 for authorised, 1 for unauthorised")?;
        output.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        Self::from_answer(&line)
    }
}
