mod payload;

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::chart::{
    ChartData, ChartFocus, PartyNames, allocation_chart, projection_chart, round_cents,
};
use crate::core::{
    AllocationResult, PartyShare, PoolContributions, ProjectionPoint, ProjectionResult,
    SplitPolicy, allocate, monthly_savings_from, project,
};
use crate::prefs::{
    FINANCE_KEY, FinancePreferences, JsonFileStore, MemoryStore, PreferenceStore, PrefsError,
    SAVINGS_KEY, SavingsPreferences,
};

pub use payload::{
    AllocatePayload, AllocateRequest, PlanPayload, ProjectPayload,
    ProjectRequest, allocate_request_from_payload, plan_requests_from_payload,
    project_request_from_payload,
};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// `None` keeps preferences in memory for the lifetime of the process.
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            data_dir: Some(PathBuf::from(".nestegg")),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn PreferenceStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let store: Arc<dyn PreferenceStore> = match &config.data_dir {
            Some(dir) => Arc::new(JsonFileStore::in_dir(dir)),
            None => Arc::new(MemoryStore::new()),
        };
        Self::new(store)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    split_policy: SplitPolicy,
    party_names: PartyNamesResponse,
    total_income: f64,
    monthly_pool_target: f64,
    expenses_pool_target: f64,
    savings_pool_target: f64,
    total_target: f64,
    per_party: PoolContributions,
    remainder_a: f64,
    remainder_b: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    chart: ChartData,
}

#[derive(Debug, Serialize)]
struct PartyNamesResponse {
    a: String,
    b: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    series: Vec<ProjectionPoint>,
    final_balance: f64,
    months_to_target: Option<u32>,
    total_contributed: f64,
    interest_earned: f64,
    chart: ChartData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    allocation: AllocationResponse,
    projection: ProjectionResponse,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct AckResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed: Option<bool>,
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr = SocketAddr::new(config.bind, config.port);
    let state = AppState::from_config(&config);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    match &config.data_dir {
        Some(dir) => log::info!("preferences stored under {}", dir.display()),
        None => log::info!("preferences kept in memory"),
    }
    log::info!("budget API listening on http://{addr}");
    log::info!("local access: http://127.0.0.1:{}/api/health", config.port);

    axum::serve(listener, app).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/allocate",
            get(allocate_get_handler).post(allocate_post_handler),
        )
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/plan", post(plan_handler))
        .route("/api/plan/saved", get(saved_plan_handler))
        .route(
            "/api/prefs/:key",
            get(prefs_get_handler)
                .put(prefs_put_handler)
                .delete(prefs_delete_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, AckResponse { ok: true, removed: None })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn allocate_get_handler(Query(payload): Query<AllocatePayload>) -> Response {
    allocate_handler_impl(payload)
}

async fn allocate_post_handler(Json(payload): Json<AllocatePayload>) -> Response {
    allocate_handler_impl(payload)
}

fn allocate_handler_impl(payload: AllocatePayload) -> Response {
    let request = allocate_request_from_payload(payload);
    let result = allocate(&request.input);
    log_allocation(&request, &result);
    json_response(StatusCode::OK, build_allocation_response(&request, &result))
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = match project_request_from_payload(payload, None) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let result = project(&request.input);
    log::debug!(
        "projected {} months, final balance {:.2}",
        result.series.len(),
        result.final_balance
    );
    json_response(
        StatusCode::OK,
        build_projection_response(
            &result,
            request.start_month.as_deref(),
            request.input.target_amount,
        ),
    )
}

async fn plan_handler(Json(payload): Json<PlanPayload>) -> Response {
    let (allocate_request, allocation, project_request) = match plan_requests_from_payload(payload)
    {
        Ok(requests) => requests,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    log_allocation(&allocate_request, &allocation);
    let projection = project(&project_request.input);

    json_response(
        StatusCode::OK,
        PlanResponse {
            allocation: build_allocation_response(&allocate_request, &allocation),
            projection: build_projection_response(
                &projection,
                project_request.start_month.as_deref(),
                project_request.input.target_amount,
            ),
        },
    )
}

async fn saved_plan_handler(State(state): State<AppState>) -> Response {
    let (finance, savings) = match load_saved_blobs(state.store.as_ref()) {
        Ok(blobs) => blobs,
        Err(err) => return store_error_response(err),
    };

    let finance = finance
        .as_ref()
        .map(FinancePreferences::from_value)
        .unwrap_or_default();
    let savings = savings
        .as_ref()
        .map(SavingsPreferences::from_value)
        .unwrap_or_default();

    let allocate_request = AllocateRequest {
        input: finance.to_allocation_input(),
        names: finance.party_names(),
        focus: ChartFocus::Totals,
    };
    let allocation = allocate(&allocate_request.input);
    let projection_input = savings.to_projection_input(monthly_savings_from(&allocation));
    let projection = project(&projection_input);

    json_response(
        StatusCode::OK,
        PlanResponse {
            allocation: build_allocation_response(&allocate_request, &allocation),
            projection: build_projection_response(
                &projection,
                savings.start_month.as_deref(),
                savings.chart_goal(),
            ),
        },
    )
}

fn load_saved_blobs(
    store: &dyn PreferenceStore,
) -> Result<(Option<Value>, Option<Value>), PrefsError> {
    Ok((store.load(FINANCE_KEY)?, store.load(SAVINGS_KEY)?))
}

async fn prefs_get_handler(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.store.load(&key) {
        Ok(Some(value)) => json_response(StatusCode::OK, value),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &format!("No preferences saved under {key:?}"),
        ),
        Err(err) => store_error_response(err),
    }
}

async fn prefs_put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> Response {
    match state.store.save(&key, value) {
        Ok(()) => {
            log::debug!("saved preferences under {key:?}");
            json_response(StatusCode::OK, AckResponse { ok: true, removed: None })
        }
        Err(err) => store_error_response(err),
    }
}

async fn prefs_delete_handler(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.store.remove(&key) {
        Ok(removed) => json_response(
            StatusCode::OK,
            AckResponse {
                ok: true,
                removed: Some(removed),
            },
        ),
        Err(err) => store_error_response(err),
    }
}

fn log_allocation(request: &AllocateRequest, result: &AllocationResult) {
    log::debug!(
        "allocated {:?} split, total target {:.2}",
        request.input.split_policy,
        result.total_target
    );
    if let Some(warning) = &result.warning {
        log::warn!("{warning}");
    }
}

pub fn build_allocation_response(
    request: &AllocateRequest,
    result: &AllocationResult,
) -> AllocationResponse {
    AllocationResponse {
        split_policy: request.input.split_policy,
        party_names: party_names_response(&request.names),
        total_income: round_cents(result.total_income),
        monthly_pool_target: round_cents(result.monthly_pool_target),
        expenses_pool_target: round_cents(result.expenses_pool_target),
        savings_pool_target: round_cents(result.savings_pool_target),
        total_target: round_cents(result.total_target),
        per_party: PoolContributions {
            monthly: rounded_share(result.per_party.monthly),
            expenses: rounded_share(result.per_party.expenses),
            savings: rounded_share(result.per_party.savings),
        },
        remainder_a: round_cents(result.remainder_a),
        remainder_b: round_cents(result.remainder_b),
        warning: result.warning.clone(),
        chart: allocation_chart(result, request.focus, &request.names),
    }
}

/// `goal` draws a flat goal line on the chart when it is positive.
pub fn build_projection_response(
    result: &ProjectionResult,
    start_month: Option<&str>,
    goal: Option<f64>,
) -> ProjectionResponse {
    ProjectionResponse {
        series: result
            .series
            .iter()
            .map(|point| ProjectionPoint {
                month_index: point.month_index,
                balance: round_cents(point.balance),
            })
            .collect(),
        final_balance: round_cents(result.final_balance),
        months_to_target: result.months_to_target,
        total_contributed: round_cents(result.total_contributed),
        interest_earned: round_cents(result.interest_earned),
        chart: projection_chart(result, start_month, goal),
    }
}

fn rounded_share(share: PartyShare) -> PartyShare {
    PartyShare {
        a: round_cents(share.a),
        b: round_cents(share.b),
    }
}

fn party_names_response(names: &PartyNames) -> PartyNamesResponse {
    PartyNamesResponse {
        a: names.a.clone(),
        b: names.b.clone(),
    }
}

fn store_error_response(err: PrefsError) -> Response {
    match err {
        PrefsError::InvalidKey(_) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
        other => {
            log::error!("preference store failure: {other}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
