use std::fmt;

use reqwest::{Method, Url};
use shared::TaskRecord;

use super::{report, ApiResponse, AuthenticatedRequester, Outcome, RequestError};

/// Printed between the created items and the listing. `println!` adds the fourth newline.
pub const SEPARATOR: &str = "\n\n\n";

/// Creates `items` numbered todo items and lists the collection afterwards.
///
/// Every outcome is reported as it arrives. The responses are returned in the order they were sent,
/// the listing being the last one.
pub async fn seed_and_list(
    requester: &AuthenticatedRequester<'_>,
    api_url: &Url,
    items: u32,
) -> Result<Vec<ApiResponse>, RequestError> {
    let mut responses = Vec::with_capacity(items as usize + 1);
    for n in 1..=items {
        let res = requester
            .send_json(Method::POST, api_url, &TaskRecord::numbered(n))
            .await?;
        report(&res);
        responses.push(res);
    }
    println!("{SEPARATOR}");
    let res = requester.send(Method::GET, api_url).await?;
    report(&res);
    responses.push(res);
    Ok(responses)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub created: usize,
    pub forbidden: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_responses(responses: &[ApiResponse]) -> Self {
        responses.iter().fold(Self::default(), |mut summary, res| {
            match res.outcome {
                Outcome::Success(_) => summary.succeeded += 1,
                Outcome::Created(_) => summary.created += 1,
                Outcome::Forbidden => summary.forbidden += 1,
                Outcome::Failure { .. } => summary.failed += 1,
            }
            summary
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ok, {} created, {} forbidden, {} failed",
            self.succeeded, self.created, self.forbidden, self.failed
        )
    }
}
