use std::sync::Arc;

use async_trait::async_trait;
use configuration::CollectionSettings;
use database::{Connector, DbError, DocumentStore, InMemoryDocumentStore, Session, StoredDocument};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(connector: Arc<dyn Connector>) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = web_server::build_router(connector, &CollectionSettings::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn in_memory() -> (Self, InMemoryDocumentStore) {
        let store = InMemoryDocumentStore::new();
        (Self::spawn(Arc::new(store.clone())).await, store)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.expect("request failed");
        let status = response.status();
        let body = response.json::<Value>().await.expect("response was not JSON");
        (status, body)
    }

    async fn send_raw(&self, method: reqwest::Method, path: &str, raw: &str) -> (StatusCode, Value) {
        self.send_as(method, path, "application/json", raw).await
    }

    async fn send_form(&self, method: reqwest::Method, path: &str, form: &str) -> (StatusCode, Value) {
        self.send_as(method, path, "application/x-www-form-urlencoded", form)
            .await
    }

    async fn send_as(
        &self,
        method: reqwest::Method,
        path: &str,
        content_type: &str,
        raw: &str,
    ) -> (StatusCode, Value) {
        let response = self
            .client
            .request(method, self.url(path))
            .header("content-type", content_type)
            .body(raw.to_string())
            .send()
            .await
            .expect("request failed");
        let status = response.status();
        let body = response.json::<Value>().await.expect("response was not JSON");
        (status, body)
    }

    async fn list(&self, path: &str) -> Vec<Value> {
        let (status, body) = self.send(reqwest::Method::GET, path, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "get data success");
        body["body"].as_array().cloned().unwrap_or_default()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A random, well-formed id nobody has inserted.
fn fresh_id() -> String {
    core_types::DocumentId::new().to_string()
}

#[tokio::test]
async fn customer_lifecycle_over_http() {
    let (server, _store) = TestServer::in_memory().await;

    let (status, body) = server
        .send(reqwest::Method::POST, "/customer", Some(json!({ "name": "Ana", "age": 30 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "post data success");
    assert_eq!(body["body"]["name"], "Ana");
    assert_eq!(body["body"]["age"], 30);
    let id = body["body"]["id"].as_str().expect("id assigned").to_string();
    assert!(!id.is_empty());

    let all = server.list("/customer").await;
    assert_eq!(all, vec![json!({ "id": id, "name": "Ana", "age": 30 })]);

    let (status, body) = server
        .send(
            reqwest::Method::PUT,
            "/customer",
            Some(json!({ "id": id, "name": "Ana", "age": 31 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "put data success");
    assert_eq!(body["body"]["age"], 31);

    let all = server.list("/customer").await;
    assert_eq!(all.len(), 1, "update must not duplicate the record");
    assert_eq!(all[0]["age"], 31);

    let (status, body) = server
        .send(reqwest::Method::DELETE, "/customer", Some(json!({ "id": id })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "delete data success");
    assert_eq!(body["body"]["id"], id);

    assert!(server.list("/customer").await.is_empty());
}

#[tokio::test]
async fn delete_removes_only_the_targeted_record() {
    let (server, _store) = TestServer::in_memory().await;

    let (_, ana) = server
        .send(reqwest::Method::POST, "/customer", Some(json!({ "name": "Ana", "age": 30 })))
        .await;
    let (_, bia) = server
        .send(reqwest::Method::POST, "/customer", Some(json!({ "name": "Bia", "age": 25 })))
        .await;

    let (status, _) = server
        .send(reqwest::Method::DELETE, "/customer", Some(json!({ "id": ana["body"]["id"] })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let all = server.list("/customer").await;
    assert_eq!(all, vec![bia["body"].clone()]);
}

#[tokio::test]
async fn unknown_ids_are_idempotent_no_ops() {
    let (server, _store) = TestServer::in_memory().await;

    let (_, ana) = server
        .send(reqwest::Method::POST, "/customer", Some(json!({ "name": "Ana", "age": 30 })))
        .await;
    let before = server.list("/customer").await;

    let ghost = fresh_id();
    let (status, body) = server
        .send(
            reqwest::Method::PUT,
            "/customer",
            Some(json!({ "id": ghost, "name": "Ghost", "age": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "put data success");

    let (status, _) = server
        .send(reqwest::Method::DELETE, "/customer", Some(json!({ "id": ghost })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let after = server.list("/customer").await;
    assert_eq!(before, after);
    assert_eq!(after, vec![ana["body"].clone()]);
}

#[tokio::test]
async fn malformed_bodies_are_rejected_and_change_nothing() {
    let (server, _store) = TestServer::in_memory().await;

    let (_, ana) = server
        .send(reqwest::Method::POST, "/customer", Some(json!({ "name": "Ana", "age": 30 })))
        .await;
    let id = ana["body"]["id"].as_str().unwrap().to_string();

    for method in [reqwest::Method::POST, reqwest::Method::PUT, reqwest::Method::DELETE] {
        let (status, body) = server.send_raw(method.clone(), "/customer", "{ not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} with broken JSON");
        assert_eq!(body, json!({ "message": "Incorrect data", "body": null }));

        let (status, _) = server
            .send(
                method.clone(),
                "/customer",
                Some(json!({ "id": id, "name": "Ana", "age": "thirty-one" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} with a mistyped field");

        let (status, _) = server
            .send(method.clone(), "/customer", Some(json!({ "id": "not-an-id" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} with a malformed id");
    }

    let all = server.list("/customer").await;
    assert_eq!(all, vec![json!({ "id": id, "name": "Ana", "age": 30 })]);
}

#[tokio::test]
async fn form_encoded_bodies_drive_the_same_operations() {
    let (server, _store) = TestServer::in_memory().await;

    let (status, body) = server
        .send_form(reqwest::Method::POST, "/customer", "name=Ana&age=30")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "post data success");
    assert_eq!(body["body"]["name"], "Ana");
    assert_eq!(body["body"]["age"], 30);
    let id = body["body"]["id"].as_str().expect("id assigned").to_string();

    let (status, body) = server
        .send_form(reqwest::Method::PUT, "/customer", &format!("id={id}&name=Ana&age=31"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "put data success");
    assert_eq!(
        server.list("/customer").await,
        vec![json!({ "id": id, "name": "Ana", "age": 31 })]
    );

    let (status, body) = server
        .send_form(reqwest::Method::POST, "/customer", "name=Bia&age=old")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Incorrect data", "body": null }));

    let (status, _) = server
        .send_form(reqwest::Method::DELETE, "/customer", &format!("id={id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(server.list("/customer").await.is_empty());
}

#[tokio::test]
async fn put_and_delete_require_an_id() {
    let (server, _store) = TestServer::in_memory().await;

    for method in [reqwest::Method::PUT, reqwest::Method::DELETE] {
        let (status, body) = server
            .send(method, "/customer", Some(json!({ "name": "Ana", "age": 30 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Incorrect data: id is required");
        assert_eq!(body["body"], Value::Null);
    }

    assert!(server.list("/customer").await.is_empty());
}

#[tokio::test]
async fn cliente_routes_use_their_own_collection_and_fields() {
    let (server, _store) = TestServer::in_memory().await;

    let (status, body) = server
        .send(reqwest::Method::POST, "/cliente", Some(json!({ "name": "Ana", "idade": 30 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["body"]["idade"], 30);
    let id = body["body"]["id"].as_str().unwrap().to_string();

    assert!(server.list("/customer").await.is_empty());

    let (status, _) = server
        .send(
            reqwest::Method::PUT,
            "/cliente",
            Some(json!({ "id": id, "name": "Ana", "idade": 31 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        server.list("/cliente").await,
        vec![json!({ "id": id, "name": "Ana", "idade": 31 })]
    );
}

#[tokio::test]
async fn health_does_not_need_a_session() {
    let server = TestServer::spawn(Arc::new(DownConnector)).await;
    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

/// Never manages to establish a session.
struct DownConnector;

#[async_trait]
impl Connector for DownConnector {
    async fn open_session(&self) -> Result<Session, DbError> {
        Err(DbError::Unreachable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn unreachable_store_aborts_with_service_unavailable() {
    let server = TestServer::spawn(Arc::new(DownConnector)).await;

    let (status, body) = server.send(reqwest::Method::GET, "/customer", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "message": "can't reach db", "body": null }));

    // The session is established before binding, so even a broken body gets 503.
    let (status, _) = server.send_raw(reqwest::Method::POST, "/customer", "{").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

/// Hands out sessions whose every operation fails.
struct BrokenStoreConnector;

struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn find_all(&self, _collection: &str) -> Result<Vec<StoredDocument>, DbError> {
        Err(DbError::Unreachable("read failed".to_string()))
    }

    async fn insert(
        &self,
        _collection: &str,
        _id: Option<Uuid>,
        _body: &Value,
    ) -> Result<Uuid, DbError> {
        Err(DbError::Unreachable("write failed".to_string()))
    }

    async fn replace(&self, _collection: &str, _id: Uuid, _body: &Value) -> Result<u64, DbError> {
        Err(DbError::Unreachable("write failed".to_string()))
    }

    async fn remove(&self, _collection: &str, _id: Uuid) -> Result<u64, DbError> {
        Err(DbError::Unreachable("write failed".to_string()))
    }

    async fn drop_collection(&self, _collection: &str) -> Result<u64, DbError> {
        Err(DbError::Unreachable("write failed".to_string()))
    }
}

#[async_trait]
impl Connector for BrokenStoreConnector {
    async fn open_session(&self) -> Result<Session, DbError> {
        Ok(Session::new(Arc::new(BrokenStore)))
    }
}

#[tokio::test]
async fn database_failures_stop_with_a_single_error_response() {
    let server = TestServer::spawn(Arc::new(BrokenStoreConnector)).await;
    let id = fresh_id();

    let cases = [
        (reqwest::Method::GET, None, "can't get data from database"),
        (
            reqwest::Method::POST,
            Some(json!({ "name": "Ana", "age": 30 })),
            "error post to db",
        ),
        (
            reqwest::Method::PUT,
            Some(json!({ "id": id, "name": "Ana", "age": 30 })),
            "error put to db",
        ),
        (reqwest::Method::DELETE, Some(json!({ "id": id })), "error delete to db"),
    ];

    for (method, payload, message) in cases {
        let (status, body) = server.send(method, "/customer", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": message, "body": null }));
    }
}
