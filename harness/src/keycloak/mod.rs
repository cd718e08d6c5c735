
use std::fmt;

use clap::Args;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Args, Clone)]
pub struct KeyCloakConfig {
    /// Keycloak url
    #[clap(long, env, default_value = "http://localhost:8080")]
    pub keycloak_url: Url,
    /// Keycloak client id
    #[clap(long, env, default_value = "todo-client")]
    pub keycloak_id: String,
    /// Keycloak client secret
    #[clap(long, env)]
    pub keycloak_secret: String,
    /// Keycloak realm
    #[clap(long, env, default_value = "todorealm")]
    pub keycloak_realm: String,
}

/// Everything needed for a password grant against one realm.
#[derive(Clone)]
pub struct Credentials {
    pub base_url: Url,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(conf: &KeyCloakConfig, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: conf.keycloak_url.clone(),
            realm: conf.keycloak_realm.clone(),
            client_id: conf.keycloak_id.clone(),
            client_secret: conf.keycloak_secret.clone(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url.as_str().trim_end_matches('/'),
            self.realm
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url.as_str())
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to retrieve token: {} - {body}", .status.as_u16())]
    Rejected { status: StatusCode, body: String },
    #[error("Token response did not contain an access token: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("Failed to reach keycloak: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Holds the access token of a single identity for the lifetime of the process.
///
/// The token is fetched once with [`TokenProvider::request_token`] and is never refreshed.
pub struct TokenProvider {
    client: Client,
    credentials: Credentials,
    token: Option<AccessToken>,
}

impl TokenProvider {
    pub fn new(client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            token: None,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Exchanges the stored credentials for an access token using the password grant.
    ///
    /// On failure the previously held token, if any, is left untouched.
    pub async fn request_token(&mut self) -> Result<&AccessToken, AuthError> {
        #[derive(serde::Deserialize)]
        struct Token {
            access_token: String,
        }
        let creds = &self.credentials;
        let url = creds.token_url();
        debug!(%url, username = %creds.username, "Requesting access token");
        let res = self
            .client
            .post(&url)
            .form(&json!({
                "client_id": creds.client_id,
                "client_secret": creds.client_secret,
                "grant_type": "password",
                "username": creds.username,
                "password": creds.password
            }))
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;
        if status != StatusCode::OK {
            return Err(AuthError::Rejected { status, body });
        }
        let token = serde_json::from_str::<Token>(&body).map_err(AuthError::MalformedResponse)?;
        info!("Token retrieved successfully");
        Ok(&*self.token.insert(AccessToken(token.access_token)))
    }
}
