use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use configs::AppConfig;
use server::startup::build_app;

struct TestApp {
    router: Router,
    data_dir: PathBuf,
}

impl TestApp {
    async fn start() -> anyhow::Result<Self> {
        Self::start_with(|_| {}).await
    }

    async fn start_with(tweak: impl FnOnce(&mut AppConfig)) -> anyhow::Result<Self> {
        // isolated data file per test
        let data_dir = std::env::temp_dir().join(format!("users_api_{}", Uuid::new_v4()));
        let mut cfg = AppConfig::default();
        cfg.storage.users_path = data_dir.join("users.json");
        tweak(&mut cfg);
        cfg.normalize_and_validate()?;
        let router = build_app(&cfg).await?;
        Ok(Self { router, data_dir })
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&v)?))?,
            None => builder.body(Body::empty())?,
        };
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, value))
    }

    async fn create(&self, first: &str, last: &str, email: &str) -> anyhow::Result<Value> {
        let (status, body) = self
            .call(
                Method::POST,
                "/user",
                Some(json!({"firstName": first, "lastName": last, "emailAddress": email})),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        Ok(body)
    }

    async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.data_dir).await;
    }
}

#[tokio::test]
async fn health_is_ok() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let (status, body) = app.call(Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn create_then_get_round_trips_fields() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let before = chrono::Utc::now();
    let created = app.create("Ann", "Lee", "ann@example.com").await?;

    let id = created["id"].as_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());
    let created_date: chrono::DateTime<chrono::Utc> = created["createdDate"].as_str().unwrap().parse()?;
    assert!(created_date >= before);
    assert_eq!(created["firstName"], "Ann");
    assert_eq!(created["lastName"], "Lee");
    assert_eq!(created["emailAddress"], "ann@example.com");

    let (status, fetched) = app.call(Method::GET, &format!("/user/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn create_with_missing_field_is_400_and_adds_nothing() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let (status, body) = app
        .call(Method::POST, "/user", Some(json!({"firstName": "Ann", "lastName": " "})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["message"].as_str().unwrap().contains("required"));

    let (_, list) = app.call(Method::GET, "/user", None).await?;
    assert_eq!(list.as_array().unwrap().len(), 0);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_400() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/user")
        .header("content-type", "application/json")
        .body(Body::from("{oops"))?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn list_pages_newest_first() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        let u = app.create(name, "Tester", &format!("{name}@example.com")).await?;
        ids.push(u["id"].as_str().unwrap().to_string());
        // distinct creation timestamps
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, page) = app.call(Method::GET, "/user?pageNumber=1&pageSize=2", None).await?;
    assert_eq!(status, StatusCode::OK);
    let got: Vec<_> = page.as_array().unwrap().iter().map(|u| u["id"].as_str().unwrap().to_string()).collect();
    assert_eq!(got, vec![ids[2].clone(), ids[1].clone()]);

    let (_, page2) = app.call(Method::GET, "/user?PageNumber=2&PageSize=2", None).await?;
    assert_eq!(page2.as_array().unwrap().len(), 1);
    assert_eq!(page2[0]["id"], ids[0].as_str());

    let (status, _) = app.call(Method::GET, "/user?pageSize=-1", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn page_size_cap_applies_when_configured() -> anyhow::Result<()> {
    let app = TestApp::start_with(|cfg| cfg.pagination.max_page_size = Some(20)).await?;
    let (status, _) = app.call(Method::GET, "/user/init", None).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, page) = app.call(Method::GET, "/user?pageSize=500", None).await?;
    assert_eq!(page.as_array().unwrap().len(), 20);
    let (_, default_page) = app.call(Method::GET, "/user", None).await?;
    assert_eq!(default_page.as_array().unwrap().len(), 10);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn update_existing_keeps_created_date() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let created = app.create("Ann", "Lee", "ann@example.com").await?;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = app
        .call(
            Method::PUT,
            &format!("/user/{id}"),
            Some(json!({"id": Uuid::new_v4(), "firstName": "Anna", "lastName": "Lee-Smith", "emailAddress": "anna@example.com"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["createdDate"], created["createdDate"]);
    assert_eq!(updated["firstName"], "Anna");
    assert_eq!(updated["lastName"], "Lee-Smith");
    assert_eq!(updated["emailAddress"], "anna@example.com");
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn update_unknown_is_404() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let existing = app.create("Ann", "Lee", "ann@example.com").await?;
    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/user/{}", Uuid::new_v4()),
            Some(json!({"firstName": "Bob", "lastName": "Ray", "emailAddress": "bob@example.com"})),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");

    let (_, list) = app.call(Method::GET, "/user", None).await?;
    assert_eq!(list, json!([existing]));
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn update_with_nil_id_or_blank_field_is_400() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let created = app.create("Ann", "Lee", "ann@example.com").await?;
    let body = json!({"firstName": "Bob", "lastName": "Ray", "emailAddress": "bob@example.com"});
    let (status, _) = app.call(Method::PUT, &format!("/user/{}", Uuid::nil()), Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = created["id"].as_str().unwrap();
    let (status, _) = app
        .call(Method::PUT, &format!("/user/{id}"), Some(json!({"firstName": "Bob", "lastName": "Ray"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn delete_existing_then_missing() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let a = app.create("Ann", "Lee", "ann@example.com").await?;
    let b = app.create("Bob", "Ray", "bob@example.com").await?;
    let a_uri = format!("/user/{}", a["id"].as_str().unwrap());

    let (status, body) = app.call(Method::DELETE, &a_uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, _) = app.call(Method::GET, &a_uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = app.call(Method::GET, "/user", None).await?;
    assert_eq!(list, json!([b]));

    let (status, _) = app.call(Method::DELETE, &a_uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn invalid_id_is_400() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    for method in [Method::GET, Method::DELETE] {
        let (status, body) = app.call(method, "/user/not-a-uuid", None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation Error");
    }
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn init_twice_resets_to_roster() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    app.create("Extra", "User", "extra@example.com").await?;

    for _ in 0..2 {
        let (status, body) = app.call(Method::GET, "/user/init", None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(true));
        let (_, all) = app.call(Method::GET, "/user?pageSize=1000", None).await?;
        assert_eq!(all.as_array().unwrap().len(), 100);
    }

    // newest roster entry lists first
    let (_, first) = app.call(Method::GET, "/user?pageSize=1", None).await?;
    let newest = first[0]["createdDate"].as_str().unwrap();
    assert!(newest.starts_with("2013-12") || newest.starts_with("2014"));
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn data_survives_restart() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    let created = app.create("Ann", "Lee", "ann@example.com").await?;

    let mut cfg = AppConfig::default();
    cfg.storage.users_path = app.data_dir.join("users.json");
    let restarted = build_app(&cfg).await?;
    let req = Request::builder()
        .uri(format!("/user/{}", created["id"].as_str().unwrap()))
        .body(Body::empty())?;
    let resp = restarted.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn seed_on_empty_loads_roster_at_startup() -> anyhow::Result<()> {
    let app = TestApp::start_with(|cfg| cfg.storage.seed_on_empty = true).await?;
    let (_, all) = app.call(Method::GET, "/user?pageSize=1000", None).await?;
    assert_eq!(all.as_array().unwrap().len(), 100);
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn metrics_and_openapi_are_served() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    app.create("Ann", "Lee", "ann@example.com").await?;

    let req = Request::builder().uri("/metrics").body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await?.to_vec())?;
    assert!(text.contains("user_directory_operations_total"));

    let (status, doc) = app.call(Method::GET, "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/user/{id}"].is_object());
    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn failed_flush_is_500() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    tokio::fs::remove_dir_all(&app.data_dir).await?;

    let body = json!({ "firstName": "Ann", "lastName": "Lee", "emailAddress": "ann@example.com" });
    let (status, err) = app.call(Method::POST, "/user", Some(body)).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err["status"], 500);

    let (status, _) = app.call(Method::GET, "/user/init", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    app.cleanup().await;
    Ok(())
}
