use httpmock::prelude::*;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::json;

use super::{seed_and_list, AuthenticatedRequester, Outcome, RequestError, Summary, SEPARATOR};
use crate::keycloak::{
    test::{authenticated_provider, credentials},
    TokenProvider,
};

const TODO_PATH: &str = "/api/TodoItems";

fn todo_url(server: &MockServer) -> Url {
    server.url(TODO_PATH).parse().unwrap()
}

#[tokio::test]
async fn refuses_to_send_without_token() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|_, then| {
            then.status(200).json_body(json!([]));
        })
        .await;

    let provider = TokenProvider::new(Client::new(), credentials(&server));
    let requester = AuthenticatedRequester::new(Client::new(), &provider);
    assert!(matches!(
        requester.send(Method::GET, &todo_url(&server)).await,
        Err(RequestError::MissingToken)
    ));
    assert!(matches!(
        requester
            .send_json(Method::POST, &todo_url(&server), &json!({ "name": "Item 1" }))
            .await,
        Err(RequestError::MissingToken)
    ));
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn ok_returns_upstream_body_unchanged() {
    let server = MockServer::start_async().await;
    let provider = authenticated_provider(&server, "abc123").await;
    let payload = json!([
        { "id": 1, "name": "Item 1", "isComplete": false },
        { "id": 2, "name": "Item 2", "isComplete": true }
    ]);
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(TODO_PATH)
                .header("authorization", "Bearer abc123")
                .header("content-type", "application/json");
            then.status(200).json_body(payload.clone());
        })
        .await;

    let requester = AuthenticatedRequester::new(Client::new(), &provider);
    let res = requester.send(Method::GET, &todo_url(&server)).await.unwrap();
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.outcome, Outcome::Success(payload));
    list.assert_async().await;
}

#[tokio::test]
async fn created_returns_upstream_body_unchanged() {
    let server = MockServer::start_async().await;
    let provider = authenticated_provider(&server, "abc123").await;
    let created = json!({ "id": 7, "name": "Item 7", "isComplete": false });
    let post = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(TODO_PATH)
                .header("authorization", "Bearer abc123")
                .json_body(json!({ "name": "Item 7", "isComplete": false }));
            then.status(201).json_body(created.clone());
        })
        .await;

    let requester = AuthenticatedRequester::new(Client::new(), &provider);
    let res = requester
        .send_json(Method::POST, &todo_url(&server), &shared::TaskRecord::numbered(7))
        .await
        .unwrap();
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.outcome, Outcome::Created(created));
    post.assert_async().await;
}

#[tokio::test]
async fn forbidden_is_reported_not_raised() {
    let server = MockServer::start_async().await;
    let provider = authenticated_provider(&server, "abc123").await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(TODO_PATH);
            then.status(403);
        })
        .await;

    let requester = AuthenticatedRequester::new(Client::new(), &provider);
    let res = requester.send(Method::GET, &todo_url(&server)).await.unwrap();
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.outcome, Outcome::Forbidden);
}

#[tokio::test]
async fn other_statuses_carry_raw_body() {
    let server = MockServer::start_async().await;
    let provider = authenticated_provider(&server, "abc123").await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(TODO_PATH);
            then.status(500).body("database on fire");
        })
        .await;

    let requester = AuthenticatedRequester::new(Client::new(), &provider);
    let res = requester.send(Method::GET, &todo_url(&server)).await.unwrap();
    assert_eq!(res.body, "database on fire");
    assert_eq!(
        res.outcome,
        Outcome::Failure {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "database on fire".into()
        }
    );
}

#[tokio::test]
async fn ok_with_invalid_json_is_an_error() {
    let server = MockServer::start_async().await;
    let provider = authenticated_provider(&server, "abc123").await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(TODO_PATH);
            then.status(200).body("<html></html>");
        })
        .await;

    let requester = AuthenticatedRequester::new(Client::new(), &provider);
    assert!(matches!(
        requester.send(Method::GET, &todo_url(&server)).await,
        Err(RequestError::Decode { status: StatusCode::OK, .. })
    ));
}

#[test]
fn outcomes_render_like_the_console_report() {
    assert_eq!(
        Outcome::Created(json!({ "id": 1 })).to_string(),
        r#"Resource created: {"id":1}"#
    );
    assert_eq!(
        Outcome::Success(json!([])).to_string(),
        "Request successful: []"
    );
    assert_eq!(Outcome::Forbidden.to_string(), "Unauthorized Access: 403");
    assert_eq!(
        Outcome::Failure {
            status: StatusCode::UNAUTHORIZED,
            body: String::new()
        }
        .to_string(),
        "Request failed: 401 - "
    );
}

#[test]
fn separator_spans_four_lines() {
    assert_eq!(format!("{SEPARATOR}\n"), "\n\n\n\n");
}

#[tokio::test]
async fn seeds_nine_items_then_lists_them() {
    let server = MockServer::start_async().await;
    let provider = authenticated_provider(&server, "abc123").await;

    let mut posts = Vec::new();
    for n in 1..=9u32 {
        let body = json!({ "name": format!("Item {n}"), "isComplete": n % 2 == 0 });
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(TODO_PATH)
                    .header("authorization", "Bearer abc123")
                    .json_body(body.clone());
                then.status(201).json_body(body);
            })
            .await;
        posts.push(mock);
    }
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(TODO_PATH)
                .header("authorization", "Bearer abc123");
            then.status(200).json_body(json!([]));
        })
        .await;

    let requester = AuthenticatedRequester::new(Client::new(), &provider);
    let responses = seed_and_list(&requester, &todo_url(&server), 9).await.unwrap();

    for post in &posts {
        post.assert_hits_async(1).await;
    }
    list.assert_hits_async(1).await;
    assert_eq!(responses.len(), 10);
    assert!(responses[..9]
        .iter()
        .all(|res| res.status == StatusCode::CREATED));
    assert_eq!(responses[9].outcome, Outcome::Success(json!([])));
    assert_eq!(
        Summary::from_responses(&responses),
        Summary {
            succeeded: 1,
            created: 9,
            forbidden: 0,
            failed: 0
        }
    );
}

#[tokio::test]
async fn unauthorised_identity_sees_only_forbidden() {
    let server = MockServer::start_async().await;
    let provider = authenticated_provider(&server, "limited").await;
    let any_todo = server
        .mock_async(|when, then| {
            when.path(TODO_PATH).header("authorization", "Bearer limited");
            then.status(403);
        })
        .await;

    let requester = AuthenticatedRequester::new(Client::new(), &provider);
    let responses = seed_and_list(&requester, &todo_url(&server), 3).await.unwrap();

    any_todo.assert_hits_async(4).await;
    assert_eq!(
        Summary::from_responses(&responses).to_string(),
        "0 ok, 0 created, 4 forbidden, 0 failed"
    );
}
