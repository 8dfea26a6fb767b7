use axum::Router;
use axum::http::header::CONTENT_TYPE;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::goal::api::{GoalState, create_goal_router};
use crate::notification::NotificationDispatcher;
use crate::task::api::{TaskState, create_task_router};

pub mod api;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let notifications = NotificationDispatcher::from_config(&config)?;

    let app = create_app_router(db, notifications).layer(
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers([CONTENT_TYPE]),
        ),
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Creates the application router serving the goal and task APIs.
pub fn create_app_router(db: DatabaseConnection, notifications: NotificationDispatcher) -> Router {
    let db = Arc::new(db);
    let goal_router = create_goal_router(Arc::new(GoalState { db: db.clone() }));
    let task_router = create_task_router(Arc::new(TaskState { db, notifications }));

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .route(
            "/api-docs/openapi.json",
            axum::routing::get(api::openapi_handler),
        )
        .merge(goal_router)
        .merge(task_router)
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
