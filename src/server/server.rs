use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::metrics::{metrics_handler, record_mutation};
use super::{log_requests, state::*, ServerConfig};
use crate::document_store::{DocumentStore, StoreError};
use crate::mutations::{
    MutationError, NotificationRouter, Operation, ResultReporter, ViewCounter,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Missing fields deserialize to empty strings so they fail validation
/// like any other blank input.
#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct DismissBody {
    pub record_id: String,
    pub kind: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct IncrementViewBody {
    pub record_id: String,
}

fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!("Unreadable mutation body: {}", rejection);
            T::default()
        }
    }
}

/// Runs a synchronous mutation off the async executor.
async fn run_mutation<T, F>(f: F) -> Result<T, MutationError>
where
    F: FnOnce() -> Result<T, MutationError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(outcome) => outcome,
        Err(join_error) => Err(StoreError::Unavailable(format!(
            "mutation task failed: {}",
            join_error
        ))
        .into()),
    }
}

fn mutation_response<T>(
    reporter: &ResultReporter,
    operation: Operation,
    outcome: Result<T, MutationError>,
    start: Instant,
) -> Response {
    let (status, outcome_label) = match &outcome {
        Ok(_) => (StatusCode::OK, "success"),
        Err(MutationError::Validation(_)) => (StatusCode::BAD_REQUEST, "validation_error"),
        Err(MutationError::Store(e)) => (StatusCode::INTERNAL_SERVER_ERROR, e.class().as_str()),
    };
    record_mutation(operation.label(), outcome_label, start.elapsed());

    (status, Json(reporter.report(operation, &outcome))).into_response()
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: state.version.clone(),
    };
    Json(stats)
}

async fn dismiss_notification(
    State(router): State<GuardedNotificationRouter>,
    State(reporter): State<ResultReporter>,
    payload: Result<Json<DismissBody>, JsonRejection>,
) -> Response {
    let body = body_or_default(payload);
    let start = Instant::now();
    let outcome = run_mutation(move || router.try_dismiss(&body.record_id, &body.kind)).await;
    mutation_response(&reporter, Operation::Dismiss, outcome, start)
}

async fn increment_view(
    State(counter): State<GuardedViewCounter>,
    State(reporter): State<ResultReporter>,
    payload: Result<Json<IncrementViewBody>, JsonRejection>,
) -> Response {
    let body = body_or_default(payload);
    let start = Instant::now();
    let outcome = run_mutation(move || counter.try_increment_view(&body.record_id)).await;
    mutation_response(&reporter, Operation::IncrementView, outcome, start)
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn DocumentStore>,
        reporter: ResultReporter,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            notification_router: Arc::new(NotificationRouter::new(
                store.clone(),
                reporter.clone(),
            )),
            view_counter: Arc::new(ViewCounter::new(store, reporter.clone())),
            reporter,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    store: Arc<dyn DocumentStore>,
    reporter: ResultReporter,
) -> Router {
    let state = ServerState::new(config, store, reporter);

    let mutation_routes: Router = Router::new()
        .route("/dismiss", post(dismiss_notification))
        .route("/increment-view", post(increment_view))
        .with_state(state.clone());

    Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/v1/mutations", mutation_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_server(
    config: ServerConfig,
    store: Arc<dyn DocumentStore>,
    reporter: ResultReporter,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, store, reporter);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    let metrics_server = axum::serve(metrics_listener, make_metrics_app());
    tokio::spawn(async move {
        if let Err(e) = metrics_server.await {
            tracing::error!("Metrics server failed: {}", e);
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
