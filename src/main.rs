//! Employee Service - organizational hierarchy lookups over HTTP.

mod config;
mod error;
mod hierarchy;
mod repository;
mod schema;
mod service;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use config::ServiceConfig;
use error::ServiceError;
use repository::SqlEmployeeRepository;
use service::EmployeeService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    employees: EmployeeService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "employee_service=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;

    let repository = SqlEmployeeRepository::connect(&config.database).await?;
    let state = AppState {
        employees: EmployeeService::new(Arc::new(repository), config.tree_strategy),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/GetEmployeeById", get(get_employee_by_id))
        .route("/EnableEmployee", put(enable_employee))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[derive(serde::Deserialize)]
struct EmployeeQuery {
    id: i64,
}

/// Fetch an employee and their reporting tree. Unknown ids yield JSON `null`.
async fn get_employee_by_id(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> Result<Response, ServiceError> {
    let body = match state.employees.get_employee_by_id(query.id).await? {
        Some(tree) => tree.to_json()?,
        None => b"null".to_vec(),
    };
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

#[derive(serde::Deserialize)]
struct EnableQuery {
    id: i64,
    /// Accepted in any form (`1`, `true`, ...) and ignored.
    enable: Option<String>,
}

/// Flip an employee's enabled flag.
async fn enable_employee(
    State(state): State<AppState>,
    Query(query): Query<EnableQuery>,
) -> Result<StatusCode, ServiceError> {
    state
        .employees
        .enable_employee(query.id, query.enable.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
