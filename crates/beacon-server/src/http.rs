use crate::dispatch::{DispatchInfo, Dispatcher};
use crate::state::{AppState, LocationState, UiEventLogEntry};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use beacon_core::{
    Alert, AlertStatus, Contact, NewContact, Notification, SettingKey, Settings,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct ApiState {
    state: AppState,
    dispatcher: Dispatcher,
    metrics: Option<PrometheusHandle>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl From<beacon_core::Error> for ApiError {
    fn from(err: beacon_core::Error) -> Self {
        match err {
            beacon_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            beacon_core::Error::NotFound(msg) => ApiError::NotFound(msg),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        };
        tracing::warn!("Request rejected: {}", self);
        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
    total_alerts: usize,
    active_alerts: usize,
    pending_dispatches: usize,
}

#[derive(Deserialize)]
struct AlertsQuery {
    status: Option<String>,
}

#[derive(Deserialize)]
struct TriggerRequest {
    category: String,
    location: String,
}

#[derive(Deserialize)]
struct EmergencyRequest {
    category: String,
    location: Option<String>,
}

#[derive(Serialize)]
struct EmergencyAccepted {
    dispatch_id: u64,
    category: String,
}

#[derive(Serialize)]
struct NotificationsResponse {
    enabled: bool,
    unread: usize,
    notifications: Vec<Notification>,
}

#[derive(Serialize)]
struct MarkAllReadResponse {
    marked: usize,
}

#[derive(Deserialize)]
struct EnabledRequest {
    enabled: bool,
}

#[derive(Deserialize)]
struct SettingRequest {
    value: bool,
}

#[derive(Deserialize)]
struct EventsQuery {
    limit: Option<usize>,
}

pub fn router(dispatcher: Dispatcher, metrics: Option<PrometheusHandle>) -> Router {
    let api = ApiState {
        state: dispatcher.state().clone(),
        dispatcher,
        metrics,
    };
    Router::new()
        .route("/health", get(health_handler))
        .route("/alerts", get(list_alerts_handler).post(trigger_handler))
        .route("/alerts/:id", get(get_alert_handler))
        .route("/alerts/:id/resolve", post(resolve_handler))
        .route("/emergency", get(pending_handler).post(emergency_handler))
        .route("/emergency/:id", delete(cancel_emergency_handler))
        .route("/contacts", get(list_contacts_handler).post(add_contact_handler))
        .route("/contacts/:id", delete(delete_contact_handler))
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/read-all", post(mark_all_read_handler))
        .route("/notifications/enabled", put(notifications_enabled_handler))
        .route("/notifications/:id/read", post(mark_read_handler))
        .route("/settings", get(settings_handler))
        .route("/settings/:key", put(update_setting_handler))
        .route("/location", get(location_handler))
        .route("/events", get(events_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(api)
}

async fn health_handler(State(api): State<ApiState>) -> Json<HealthResponse> {
    let (total_alerts, active_alerts) = {
        let alerts = api.state.alerts.read().await;
        (alerts.len(), alerts.active_count())
    };
    Json(HealthResponse {
        status: "OK",
        uptime_seconds: api.state.uptime_seconds(),
        total_alerts,
        active_alerts,
        pending_dispatches: api.state.dispatches.len(),
    })
}

async fn list_alerts_handler(
    State(api): State<ApiState>,
    query: Result<Query<AlertsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Alert>>> {
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<AlertStatus>)
        .transpose()?;
    Ok(Json(api.state.list_alerts(status).await))
}

async fn get_alert_handler(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Alert>> {
    let alert = api.state.alerts.read().await.get(&id).cloned();
    match alert {
        Some(alert) => Ok(Json(alert)),
        None => Err(beacon_core::Error::not_found("alert", &id).into()),
    }
}

async fn trigger_handler(
    State(api): State<ApiState>,
    payload: Result<Json<TriggerRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Alert>)> {
    let Json(req) = payload?;
    let alert = api.state.trigger_alert(&req.category, &req.location).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

async fn resolve_handler(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Alert>> {
    Ok(Json(api.state.resolve_alert(&id).await?))
}

async fn pending_handler(State(api): State<ApiState>) -> Json<Vec<DispatchInfo>> {
    Json(api.state.dispatches.pending())
}

async fn emergency_handler(
    State(api): State<ApiState>,
    payload: Result<Json<EmergencyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EmergencyAccepted>)> {
    let Json(req) = payload?;
    let pending = api
        .dispatcher
        .start(&req.category, req.location.as_deref())
        .await?;
    let category = pending.category().to_string();
    let dispatch_id = pending.detach();
    Ok((
        StatusCode::ACCEPTED,
        Json(EmergencyAccepted {
            dispatch_id,
            category,
        }),
    ))
}

async fn cancel_emergency_handler(
    State(api): State<ApiState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    api.dispatcher.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_contacts_handler(State(api): State<ApiState>) -> Json<Vec<Contact>> {
    Json(api.state.contacts.read().await.list())
}

async fn add_contact_handler(
    State(api): State<ApiState>,
    payload: Result<Json<NewContact>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    let Json(new) = payload?;
    let contact = api.state.add_contact(new).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn delete_contact_handler(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    api.state.delete_contact(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_notifications_handler(State(api): State<ApiState>) -> Json<NotificationsResponse> {
    let store = api.state.notifications.read().await;
    Json(NotificationsResponse {
        enabled: store.enabled(),
        unread: store.unread_count(),
        notifications: store.list(),
    })
}

async fn mark_read_handler(
    State(api): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(api.state.mark_notification_read(&id).await?))
}

async fn mark_all_read_handler(State(api): State<ApiState>) -> Json<MarkAllReadResponse> {
    let marked = api.state.mark_all_notifications_read().await;
    Json(MarkAllReadResponse { marked })
}

async fn notifications_enabled_handler(
    State(api): State<ApiState>,
    payload: Result<Json<EnabledRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(req) = payload?;
    api.state.set_notifications_enabled(req.enabled).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn settings_handler(State(api): State<ApiState>) -> Json<Settings> {
    Json(api.state.settings.read().await.clone())
}

async fn update_setting_handler(
    State(api): State<ApiState>,
    Path(key): Path<String>,
    payload: Result<Json<SettingRequest>, JsonRejection>,
) -> ApiResult<Json<Settings>> {
    let Json(req) = payload?;
    let key: SettingKey = key.parse()?;
    Ok(Json(api.state.set_setting(key, req.value).await))
}

async fn location_handler(State(api): State<ApiState>) -> Json<LocationState> {
    Json(api.state.location.read().await.clone())
}

async fn events_handler(
    State(api): State<ApiState>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<UiEventLogEntry>>> {
    let Query(query) = query?;
    Ok(Json(api.state.get_events(query.limit.unwrap_or(50)).await))
}

async fn metrics_handler(State(api): State<ApiState>) -> impl IntoResponse {
    match &api.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "# metrics recorder not installed\n".to_string(),
        ),
    }
}
