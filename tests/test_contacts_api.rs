//! HTTP-level tests: the real router served on an ephemeral port, backed by the
//! in-memory repository, driven with reqwest.

use async_trait::async_trait;
use contacts_api::domain::{ContactPage, PageRequest, PatchPlan};
use contacts_api::transport;
use contacts_api::{Contact, ContactError, ContactInput, ContactRepository, ContactResult};
use contacts_api::InMemoryContactRepository;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start<R: ContactRepository + 'static>(repository: R) -> Self {
        let router = transport::http::create_router(transport::http::AppState::new(repository));

        // Bind to an ephemeral port so tests can run in parallel.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn in_memory() -> Self {
        Self::start(InMemoryContactRepository::new()).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create(&self, body: Value) -> (StatusCode, Value) {
        let resp = self.client.post(self.url("/contacts")).json(&body).send().await.unwrap();
        read(resp).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        read(resp).await
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self.client.put(self.url(path)).json(&body).send().await.unwrap();
        read(resp).await
    }

    async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self.client.patch(self.url(path)).json(&body).send().await.unwrap();
        read(resp).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let text = resp.text().await.unwrap();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, body)
}

fn ann() -> Value {
    json!({"firstName": "Ann", "lastName": "Lee", "email": "ann@x.com"})
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn contact_lifecycle_scenario() {
    let server = TestServer::in_memory().await;

    let (status, created) = server.create(ann()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert!(created["company"].is_null());
    assert!(created["phone"].is_null());
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let (status, patched) = server.patch("/contacts/1", json!({"company": "Acme"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["company"], "Acme");
    assert_eq!(patched["firstName"], "Ann");
    assert_eq!(patched["createdAt"], created["createdAt"]);

    let (status, body) = server.create(ann()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email already exists");

    let resp = server.client.delete(server.url("/contacts/1")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.text().await.unwrap().is_empty());

    let (status, body) = server.get("/contacts/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "contact 1 not found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn create_then_get_round_trips_all_fields() {
    let server = TestServer::in_memory().await;
    let (_, created) = server
        .create(json!({
            "firstName": "Bo",
            "lastName": "Park",
            "company": "Initech",
            "email": "bo@initech.io",
            "phone": "+1 555 0100"
        }))
        .await;

    let (status, fetched) = server.get(&format!("/contacts/{}", created["id"])).await;
    assert_eq!(status, StatusCode::OK);
    let created: Contact = serde_json::from_value(created).unwrap();
    let fetched: Contact = serde_json::from_value(fetched).unwrap();
    assert_eq!(created, fetched);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn create_rejects_invalid_payloads() {
    let server = TestServer::in_memory().await;

    let (status, body) = server.create(json!({"lastName": "Lee", "email": "ann@x.com"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "firstName is required");

    let (status, body) = server
        .create(json!({"firstName": "Ann", "lastName": " ", "email": "ann@x.com"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "lastName is required");

    let (status, body) = server
        .create(json!({"firstName": "Ann", "lastName": "Lee", "email": "ann at x.com"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid email");

    let (status, body) = server
        .create(json!({"firstName": "Ann", "lastName": "Lee", "email": "ann@x.com", "nickname": "A"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let resp = server
        .client
        .post(server.url("/contacts"))
        .header("content-type", "application/json")
        .body("{\"firstName\": ")
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, page) = server.get("/contacts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_identifiers_are_bad_requests() {
    let server = TestServer::in_memory().await;

    // %FF decodes to invalid UTF-8 and is rejected by the extractor itself,
    // yet still answers with the JSON error shape.
    let paths = ["/contacts/abc", "/contacts/0", "/contacts/-4", "/contacts/1.5", "/contacts/%FF"];
    for path in paths {
        let (status, body) = server.get(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "GET {path}");
        assert!(body["error"].as_str().unwrap().starts_with("invalid id"));
    }

    let (status, _) = server.put("/contacts/abc", ann()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = server.patch("/contacts/abc", json!({"company": "Acme"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let resp = server.client.delete(server.url("/contacts/zero")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let (status, body) = server.put("/contacts/%FF", ann()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid id"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn list_paginates_and_normalises_parameters() {
    let server = TestServer::in_memory().await;
    for i in 1..=3 {
        let (status, _) = server
            .create(json!({"firstName": "N", "lastName": "M", "email": format!("n{i}@x.com")}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = server.get("/contacts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 50);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);

    let (_, page) = server.get("/contacts?page=0&pageSize=2").await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 2);
    let ids: Vec<i64> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let (_, page) = server.get("/contacts?page=2&pageSize=2").await;
    assert_eq!(page["items"][0]["id"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let (_, page) = server.get("/contacts?page=abc&pageSize=500").await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 50);

    let (_, page) = server.get("/contacts?pageSize=-1").await;
    assert_eq!(page["pageSize"], 50);

    let (status, page) = server.get("/contacts?page=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn patch_semantics() {
    let server = TestServer::in_memory().await;
    let (_, created) = server
        .create(json!({
            "firstName": "Ann", "lastName": "Lee", "email": "ann@x.com",
            "company": "Acme", "phone": "555"
        }))
        .await;
    server
        .create(json!({"firstName": "Bob", "lastName": "Roe", "email": "bob@x.com"}))
        .await;

    let (status, body) = server.patch("/contacts/1", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no updatable fields provided");
    let (_, unchanged) = server.get("/contacts/1").await;
    assert_eq!(unchanged, created);

    let (status, body) = server.patch("/contacts/1", json!({"firstName": "  "})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "firstName is required");

    let (status, body) = server.patch("/contacts/1", json!({"email": "nope"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid email");

    let (status, _) = server.patch("/contacts/1", json!({"shoeSize": 9})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server.patch("/contacts/1", json!({"email": "bob@x.com"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email already exists");

    let (status, body) = server.patch("/contacts/99", json!({"company": "Acme"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "contact 99 not found");

    // Explicit null clears an optional field; absent fields stay as they were.
    let (status, patched) = server
        .patch("/contacts/1", json!({"company": null, "lastName": "Kim"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(patched["company"].is_null());
    assert_eq!(patched["phone"], "555");
    assert_eq!(patched["lastName"], "Kim");
    assert_eq!(patched["email"], "ann@x.com");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_update_replaces_and_is_idempotent() {
    let server = TestServer::in_memory().await;
    server
        .create(json!({"firstName": "Ann", "lastName": "Lee", "email": "ann@x.com", "company": "Acme"}))
        .await;
    server
        .create(json!({"firstName": "Bob", "lastName": "Roe", "email": "bob@x.com"}))
        .await;

    let replacement = json!({"firstName": "Anna", "lastName": "Lee", "email": "anna@x.com"});
    let (status, first) = server.put("/contacts/1", replacement.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["firstName"], "Anna");
    assert!(first["company"].is_null(), "omitted optional fields are cleared by PUT");

    let (status, second) = server.put("/contacts/1", replacement).await;
    assert_eq!(status, StatusCode::OK);
    for field in ["id", "firstName", "lastName", "company", "email", "phone", "createdAt"] {
        assert_eq!(first[field], second[field], "{field} changed between identical PUTs");
    }

    let (status, _) = server
        .put("/contacts/1", json!({"firstName": "Anna", "lastName": "Lee", "email": "bob@x.com"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = server.put("/contacts/7", ann()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .put("/contacts/1", json!({"firstName": "", "lastName": "Lee", "email": "anna@x.com"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delete_unknown_contact_is_not_found() {
    let server = TestServer::in_memory().await;
    let resp = server.client.delete(server.url("/contacts/5")).send().await.unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "contact 5 not found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_reports_ok() {
    let server = TestServer::in_memory().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn responses_carry_a_request_id() {
    let server = TestServer::in_memory().await;

    let resp = server.client.get(server.url("/contacts/404")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let generated = resp.headers()["x-request-id"].to_str().unwrap().to_string();
    assert_eq!(generated.len(), 36, "expected a UUID, got {generated:?}");

    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_ne!(resp.headers()["x-request-id"], generated.as_str());

    let resp = server
        .client
        .get(server.url("/health"))
        .header("x-request-id", "caller-42")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "caller-42");
}

/// A store that fails every operation, as an unreachable database would.
struct UnavailableRepository;

#[async_trait]
impl ContactRepository for UnavailableRepository {
    async fn create(&self, _input: &ContactInput) -> ContactResult<Contact> {
        Err(down())
    }
    async fn get_by_id(&self, _id: i64) -> ContactResult<Contact> {
        Err(down())
    }
    async fn list(&self, _page: PageRequest) -> ContactResult<ContactPage> {
        Err(down())
    }
    async fn update(&self, _id: i64, _input: &ContactInput) -> ContactResult<Contact> {
        Err(down())
    }
    async fn patch(&self, _plan: &PatchPlan) -> ContactResult<()> {
        Err(down())
    }
    async fn delete(&self, _id: i64) -> ContactResult<()> {
        Err(down())
    }
    async fn ping(&self) -> ContactResult<()> {
        Err(down())
    }
}

fn down() -> ContactError {
    ContactError::StorageUnavailable("connection refused".to_string())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn storage_failures_surface_as_500_with_cause() {
    let server = TestServer::start(UnavailableRepository).await;

    let (status, body) = server.create(ann()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "connection refused");

    let (status, _) = server.get("/contacts/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = server.patch("/contacts/1", json!({"phone": "1"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // Input defects are still reported before any storage access.
    let (status, _) = server.patch("/contacts/1", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}
