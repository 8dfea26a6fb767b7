#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use goal_tracker_server::notification::{
    Notification, NotificationDispatcher, NotificationError, Notifier,
};
use goal_tracker_server::web::create_app_router;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const CHANNEL: &str = "C05769EL4RF";

/// Creates a fresh in-memory database with all migrations applied.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // Every pooled connection to `sqlite::memory:` would see its own database.
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Notifier that hands every notification to a channel the test can read.
pub struct RecordingNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let _ = self.sender.send(notification.clone());
        Ok(())
    }
}

/// Notifier whose deliveries always fail.
pub struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Provider("service_unavailable".to_string()))
    }
}

pub fn dispatcher(notifier: impl Notifier + 'static) -> NotificationDispatcher {
    NotificationDispatcher::new(Arc::new(notifier), CHANNEL.to_string(), Duration::from_secs(1))
}

/// Test context for endpoint tests.
pub struct TestContext {
    pub app: Router,
    pub db: DatabaseConnection,
    pub notifications: mpsc::UnboundedReceiver<Notification>,
}

/// Sets up a router over a fresh database whose notifications are recorded.
pub async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let db = setup_db().await?;
    let (sender, notifications) = mpsc::unbounded_channel();
    let app = create_app_router(db.clone(), dispatcher(RecordingNotifier { sender }));
    Ok(TestContext {
        app,
        db,
        notifications,
    })
}

/// Sets up a router over a fresh database whose notifications always fail.
pub async fn setup_with_failing_notifier() -> anyhow::Result<TestContext> {
    let _ = tracing_subscriber::fmt().try_init();
    let db = setup_db().await?;
    let (_sender, notifications) = mpsc::unbounded_channel();
    let app = create_app_router(db.clone(), dispatcher(FailingNotifier));
    Ok(TestContext {
        app,
        db,
        notifications,
    })
}

/// Status and body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

/// Sends a request to the router, with `body` as JSON when given.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        body: String::from_utf8(body.to_vec()).unwrap(),
    }
}

pub async fn create_goal(app: &Router, title: &str) -> i64 {
    let response = send(
        app,
        Method::POST,
        "/goals",
        Some(serde_json::json!({ "title": title })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()["goal"]["goal_id"].as_i64().unwrap()
}

pub async fn create_task(app: &Router, title: &str, description: &str) -> i64 {
    let response = send(
        app,
        Method::POST,
        "/tasks",
        Some(serde_json::json!({ "title": title, "description": description })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()["task"]["task_id"].as_i64().unwrap()
}
