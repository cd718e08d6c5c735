mod seed;
#[cfg(test)]
mod test;

use std::fmt;

use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    Client, Method, StatusCode, Url,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::keycloak::{AccessToken, TokenProvider};

pub use seed::{seed_and_list, Summary, SEPARATOR};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Token not obtained. Call `request_token` first.")]
    MissingToken,
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Expected a json body with status {}: {source}", .status.as_u16())]
    Decode {
        status: StatusCode,
        source: serde_json::Error,
    },
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// How a single api call turned out.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Created(Value),
    Forbidden,
    Failure { status: StatusCode, body: String },
}

impl Outcome {
    fn classify(status: StatusCode, body: &str) -> Result<Self, RequestError> {
        let json = || {
            serde_json::from_str::<Value>(body).map_err(|source| RequestError::Decode { status, source })
        };
        Ok(match status {
            StatusCode::OK => Outcome::Success(json()?),
            StatusCode::CREATED => Outcome::Created(json()?),
            StatusCode::FORBIDDEN => Outcome::Forbidden,
            status => Outcome::Failure {
                status,
                body: body.to_owned(),
            },
        })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(body) => write!(f, "Request successful: {body}"),
            Outcome::Created(body) => write!(f, "Resource created: {body}"),
            Outcome::Forbidden => f.write_str("Unauthorized Access: 403"),
            Outcome::Failure { status, body } => {
                write!(f, "Request failed: {} - {body}", status.as_u16())
            }
        }
    }
}

/// The raw response of one api call together with its classification.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    pub outcome: Outcome,
}

pub fn report(response: &ApiResponse) {
    debug!(
        status = response.status.as_u16(),
        headers = ?response.headers,
        bytes = response.body.len(),
        "Response received"
    );
    println!("{}", response.outcome);
}

/// Sends requests to the todo api on behalf of the identity held by a [`TokenProvider`].
pub struct AuthenticatedRequester<'a> {
    client: Client,
    tokens: &'a TokenProvider,
}

impl<'a> AuthenticatedRequester<'a> {
    pub fn new(client: Client, tokens: &'a TokenProvider) -> Self {
        Self { client, tokens }
    }

    pub async fn send(&self, method: Method, url: &Url) -> Result<ApiResponse, RequestError> {
        let token = self.token()?;
        self.dispatch(token, method, url, None).await
    }

    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: &B,
    ) -> Result<ApiResponse, RequestError> {
        let token = self.token()?;
        let body = serde_json::to_vec(body).map_err(RequestError::Encode)?;
        self.dispatch(token, method, url, Some(body)).await
    }

    fn token(&self) -> Result<&'a AccessToken, RequestError> {
        self.tokens.token().ok_or(RequestError::MissingToken)
    }

    async fn dispatch(
        &self,
        token: &AccessToken,
        method: Method,
        url: &Url,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse, RequestError> {
        debug!(%method, %url, "Sending request");
        let mut req = self
            .client
            .request(method, url.clone())
            .bearer_auth(token.secret())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.body(body);
        }
        let res = req.send().await?;
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.text().await?;
        let outcome = Outcome::classify(status, &body)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
            outcome,
        })
    }
}
