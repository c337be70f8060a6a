use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use shared::{
    domain::{Contact, ContactId, NewContact},
    error::ErrorCode,
    protocol::{PageRequest, TOTAL_COUNT_HEADER},
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    controller::{DirectoryController, LoadOutcome},
    error::ClientError,
    ContactBackend, HttpContactBackend,
};

#[derive(Clone, Default)]
struct ServerState {
    contacts: Arc<Mutex<Vec<Contact>>>,
    received_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn list_users(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.received_queries.lock().await.push(params.clone());
    let page: usize = params.get("_page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("_limit").and_then(|v| v.parse().ok()).unwrap_or(10);
    let query = params.get("q").map(|q| q.to_lowercase());

    let contacts = state.contacts.lock().await;
    let filtered: Vec<Contact> = contacts
        .iter()
        .filter(|c| {
            query
                .as_deref()
                .map_or(true, |q| c.name.to_lowercase().contains(q))
        })
        .cloned()
        .collect();
    let items: Vec<Contact> = filtered
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();
    (
        [(TOTAL_COUNT_HEADER, filtered.len().to_string())],
        Json(items),
    )
        .into_response()
}

async fn get_user(State(state): State<ServerState>, Path(id): Path<i64>) -> Response {
    let contacts = state.contacts.lock().await;
    match contacts.iter().find(|c| c.id == ContactId(id)) {
        Some(contact) => Json(contact.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn create_user(
    State(state): State<ServerState>,
    Json(payload): Json<NewContact>,
) -> Response {
    let mut contacts = state.contacts.lock().await;
    let id = contacts.iter().map(|c| c.id.0).max().unwrap_or(0) + 1;
    let created = Contact {
        id: ContactId(id),
        name: payload.name,
        description: payload.description,
        photo_url: payload.photo_url,
    };
    contacts.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn delete_user(State(state): State<ServerState>, Path(id): Path<i64>) -> Response {
    let mut contacts = state.contacts.lock().await;
    let before = contacts.len();
    contacts.retain(|c| c.id != ContactId(id));
    if contacts.len() == before {
        (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
    } else {
        Json(json!({})).into_response()
    }
}

async fn failing_list() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "message": "database offline" })),
    )
        .into_response()
}

async fn uncounted_list(State(state): State<ServerState>) -> Response {
    Json(state.contacts.lock().await.clone()).into_response()
}

async fn garbled_list() -> Response {
    (
        [(TOTAL_COUNT_HEADER, "1".to_string())],
        "not json at all",
    )
        .into_response()
}

fn seeded(count: i64) -> Vec<Contact> {
    (1..=count)
        .map(|id| Contact {
            id: ContactId(id),
            name: format!("person-{id}"),
            description: format!("team member {id}"),
            photo_url: format!("https://cdn.example.com/{id}.png"),
        })
        .collect()
}

async fn spawn_directory_server(contacts: Vec<Contact>) -> Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState {
        contacts: Arc::new(Mutex::new(contacts)),
        ..ServerState::default()
    };
    let app = Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:id", get(get_user).delete(delete_user))
        .route("/failing/users", get(failing_list))
        .route("/uncounted/users", get(uncounted_list))
        .route("/garbled/users", get(garbled_list))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[tokio::test]
async fn list_reads_items_and_total_header() {
    let (server_url, state) = spawn_directory_server(seeded(23)).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/api/")).expect("backend");

    let page = backend
        .list_contacts(&PageRequest::new(3, 10, None))
        .await
        .expect("list");

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0].id, ContactId(21));
    assert_eq!(page.total, 23);
    let received = state.received_queries.lock().await.clone();
    assert_eq!(received[0].get("_page").map(String::as_str), Some("3"));
    assert_eq!(received[0].get("_limit").map(String::as_str), Some("10"));
    assert!(!received[0].contains_key("q"));
}

#[tokio::test]
async fn list_sends_query_only_when_searching() {
    let (server_url, state) = spawn_directory_server(seeded(12)).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/api")).expect("backend");

    let page = backend
        .list_contacts(&PageRequest::new(1, 5, Some("person-1")))
        .await
        .expect("list");

    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 4);
    let received = state.received_queries.lock().await.clone();
    assert_eq!(received[0].get("q").map(String::as_str), Some("person-1"));
}

#[tokio::test]
async fn search_with_no_match_returns_empty_page() {
    let (server_url, _state) = spawn_directory_server(seeded(4)).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/api")).expect("backend");

    let page = backend
        .list_contacts(&PageRequest::new(1, 10, Some("zzz-no-match")))
        .await
        .expect("list");

    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn missing_total_header_falls_back_to_page_length() {
    let (server_url, _state) = spawn_directory_server(seeded(3)).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/uncounted")).expect("backend");

    let page = backend
        .list_contacts(&PageRequest::new(1, 10, None))
        .await
        .expect("list");

    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let (server_url, _state) = spawn_directory_server(Vec::new()).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/failing")).expect("backend");

    let err = backend
        .list_contacts(&PageRequest::new(1, 10, None))
        .await
        .expect_err("must fail");

    match err {
        ClientError::Backend(api) => {
            assert_eq!(api.status, 503);
            assert_eq!(api.code, ErrorCode::Internal);
            assert_eq!(api.message, "database offline");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_invalid_response() {
    let (server_url, _state) = spawn_directory_server(Vec::new()).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/garbled")).expect("backend");

    let err = backend
        .list_contacts(&PageRequest::new(1, 10, None))
        .await
        .expect_err("must fail");

    assert!(matches!(err, ClientError::InvalidResponse(_)), "{err:?}");
}

#[tokio::test]
async fn get_and_delete_report_not_found() {
    let (server_url, _state) = spawn_directory_server(seeded(1)).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/api")).expect("backend");

    let found = backend.get_contact(ContactId(1)).await.expect("get");
    assert_eq!(found.name, "person-1");

    let err = backend.get_contact(ContactId(42)).await.expect_err("missing");
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "404 Not Found");

    backend.delete_contact(ContactId(1)).await.expect("delete");
    let err = backend
        .delete_contact(ContactId(1))
        .await
        .expect_err("already gone");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn create_posts_photo_name_description() {
    let (server_url, state) = spawn_directory_server(seeded(2)).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/api")).expect("backend");

    let created = backend
        .create_contact(&NewContact::new(
            "https://cdn.example.com/new.webp",
            "Nia",
            "Support",
        ))
        .await
        .expect("create");

    assert_eq!(created.id, ContactId(3));
    assert_eq!(created.photo_url, "https://cdn.example.com/new.webp");
    assert_eq!(state.contacts.lock().await.len(), 3);
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let backend = HttpContactBackend::new(&format!("http://{addr}/api")).expect("backend");

    let err = backend
        .list_contacts(&PageRequest::new(1, 10, None))
        .await
        .expect_err("must fail");

    assert!(err.is_transport(), "{err:?}");
}

#[test]
fn rejects_non_http_base_url() {
    assert!(matches!(
        HttpContactBackend::new("ftp://example.com/api"),
        Err(ClientError::InvalidUrl(_))
    ));
    assert!(matches!(
        HttpContactBackend::new("not a url"),
        Err(ClientError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn controller_steps_back_after_deleting_last_row_over_http() {
    let (server_url, _state) = spawn_directory_server(seeded(6)).await.expect("spawn server");
    let backend = HttpContactBackend::new(&format!("{server_url}/api")).expect("backend");
    let controller = DirectoryController::new(Arc::new(backend), 5);

    assert_eq!(controller.change_page(2, 5).await, LoadOutcome::Loaded);
    assert_eq!(controller.snapshot().await.items.len(), 1);

    controller.remove(ContactId(6)).await.expect("remove");

    let state = controller.snapshot().await;
    assert_eq!(state.current_page, 1);
    assert_eq!(state.items.len(), 5);
    assert_eq!(state.total, 5);
}
