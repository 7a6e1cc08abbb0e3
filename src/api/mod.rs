use axum::{
    Router,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    Debt, DebtOrder, PayoffPoint, SnowballCalculationResult, calculate_snowball,
    months_to_payoff, order_debts, payoff_series, sample_debts, sanitize_debts,
};
use crate::error::PlanError;
use crate::profile::{
    DEFAULT_MONTHLY_CONTRIBUTION, InMemoryProfileStore, ProfileStore, UserProfile, check_amount,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliDebtOrder {
    AsGiven,
    Balance,
    MinimumPayment,
}

impl From<CliDebtOrder> for DebtOrder {
    fn from(value: CliDebtOrder) -> Self {
        match value {
            CliDebtOrder::AsGiven => DebtOrder::AsGiven,
            CliDebtOrder::Balance => DebtOrder::Balance,
            CliDebtOrder::MinimumPayment => DebtOrder::MinimumPayment,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiDebtOrder {
    AsGiven,
    Balance,
    MinimumPayment,
}

impl FromStr for ApiDebtOrder {
    type Err = PlanError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "as-given" | "asGiven" | "as_given" => Ok(ApiDebtOrder::AsGiven),
            "balance" | "smallest-balance" | "smallestBalance" => Ok(ApiDebtOrder::Balance),
            "minimum-payment" | "minimumPayment" | "minimum_payment" => {
                Ok(ApiDebtOrder::MinimumPayment)
            }
            other => Err(PlanError::UnknownOrder(other.to_string())),
        }
    }
}

impl From<ApiDebtOrder> for DebtOrder {
    fn from(value: ApiDebtOrder) -> Self {
        match value {
            ApiDebtOrder::AsGiven => DebtOrder::AsGiven,
            ApiDebtOrder::Balance => DebtOrder::Balance,
            ApiDebtOrder::MinimumPayment => DebtOrder::MinimumPayment,
        }
    }
}

impl From<DebtOrder> for ApiDebtOrder {
    fn from(value: DebtOrder) -> Self {
        match value {
            DebtOrder::AsGiven => ApiDebtOrder::AsGiven,
            DebtOrder::Balance => ApiDebtOrder::Balance,
            DebtOrder::MinimumPayment => ApiDebtOrder::MinimumPayment,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SnowballPayload {
    #[serde(alias = "bills")]
    debts: Option<Vec<Debt>>,
    #[serde(alias = "monthlyContribution")]
    monthly_extra: Option<f64>,
    order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfilePlanQuery {
    order: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "snowball",
    about = "Debt snowball payoff planner (freed minimums + monthly extra payment)"
)]
struct Cli {
    #[arg(
        long,
        help = "Profile JSON file with monthlyContribution and bills, as stored for a user"
    )]
    profile: Option<PathBuf>,
    #[arg(
        long = "debt",
        value_name = "NAME:RATE:AMOUNT:BALANCE",
        help = "Debt to include; RATE is APR in percent, AMOUNT the minimum monthly payment"
    )]
    debts: Vec<String>,
    #[arg(
        long,
        help = "Monthly extra payment; defaults to the profile's contribution, or 100"
    )]
    monthly_extra: Option<f64>,
    #[arg(long, value_enum, default_value_t = CliDebtOrder::Balance)]
    order: CliDebtOrder,
    #[arg(long, default_value_t = false, help = "Pretty-print the JSON result")]
    pretty: bool,
}

#[derive(Debug)]
struct PlanRequest {
    debts: Vec<Debt>,
    monthly_extra: f64,
    order: DebtOrder,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DebtPayoffSummary {
    name: String,
    months_to_payoff: Option<u32>,
    series: Vec<PayoffPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    order: ApiDebtOrder,
    monthly_extra: f64,
    #[serde(flatten)]
    result: SnowballCalculationResult,
    debt_payoff: Vec<DebtPayoffSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    user_id: String,
    stored: bool,
    #[serde(flatten)]
    profile: UserProfile,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
pub struct AppState {
    profiles: Arc<dyn ProfileStore>,
}

impl AppState {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProfileStore::new()))
    }
}

fn parse_debt_arg(raw: &str) -> Result<Debt, PlanError> {
    let mut parts = raw.rsplitn(4, ':');
    let (Some(balance), Some(amount), Some(rate), Some(name)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(PlanError::MalformedDebt(raw.to_string()));
    };

    let number = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| PlanError::MalformedDebt(raw.to_string()))
    };
    Ok(Debt::new(
        name.trim(),
        number(rate)?,
        number(amount)?,
        number(balance)?,
    ))
}

fn build_plan_request(
    debts: Vec<Debt>,
    monthly_extra: f64,
    order: DebtOrder,
) -> Result<PlanRequest, PlanError> {
    check_amount("monthlyExtra", monthly_extra)?;
    let profile = UserProfile {
        monthly_contribution: monthly_extra,
        bills: debts,
    };
    profile.validate()?;

    Ok(PlanRequest {
        debts: order_debts(&sanitize_debts(&profile.bills), order),
        monthly_extra,
        order,
    })
}

fn plan_request_from_cli(cli: &Cli) -> Result<PlanRequest, PlanError> {
    let profile = cli
        .profile
        .as_deref()
        .map(UserProfile::from_path)
        .transpose()?;

    let mut debts = profile
        .as_ref()
        .map(|p| p.bills.clone())
        .unwrap_or_default();
    for raw in &cli.debts {
        debts.push(parse_debt_arg(raw)?);
    }
    if debts.is_empty() && profile.is_none() {
        info!("no debts given; planning the sample debts");
        debts = sample_debts();
    }

    let monthly_extra = cli
        .monthly_extra
        .or(profile.as_ref().map(|p| p.monthly_contribution))
        .unwrap_or(DEFAULT_MONTHLY_CONTRIBUTION);

    build_plan_request(debts, monthly_extra, cli.order.into())
}

fn parse_order(raw: Option<&str>) -> Result<DebtOrder, PlanError> {
    Ok(raw
        .map(ApiDebtOrder::from_str)
        .transpose()?
        .map_or(DebtOrder::Balance, DebtOrder::from))
}

fn plan_request_from_payload(payload: SnowballPayload) -> Result<PlanRequest, PlanError> {
    let order = parse_order(payload.order.as_deref())?;
    build_plan_request(
        payload.debts.unwrap_or_else(sample_debts),
        payload
            .monthly_extra
            .unwrap_or(DEFAULT_MONTHLY_CONTRIBUTION),
        order,
    )
}

fn run_plan(request: PlanRequest) -> PlanResponse {
    let result = calculate_snowball(&request.debts, request.monthly_extra);
    plan_response(result, request.order, request.monthly_extra)
}

fn plan_response(
    result: SnowballCalculationResult,
    order: DebtOrder,
    monthly_extra: f64,
) -> PlanResponse {
    let debt_payoff = result
        .schedules
        .iter()
        .map(|schedule| DebtPayoffSummary {
            name: schedule.debt.name.clone(),
            months_to_payoff: months_to_payoff(schedule),
            series: payoff_series(schedule),
        })
        .collect();

    PlanResponse {
        order: order.into(),
        monthly_extra,
        result,
        debt_payoff,
    }
}

pub fn run_cli<I, T>(args: I) -> Result<String, PlanError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let request = plan_request_from_cli(&cli)?;
    let response = run_plan(request);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    Ok(json)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/snowball",
            get(snowball_get_handler).post(snowball_post_handler),
        )
        .route(
            "/api/profile/:user_id",
            get(get_profile_handler).put(put_profile_handler),
        )
        .route("/api/profile/:user_id/plan", get(profile_plan_handler))
        .route("/api/profile/:user_id/debts", post(add_debt_handler))
        .route(
            "/api/profile/:user_id/debts/:index",
            delete(remove_debt_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState::in_memory());

    let listener = TcpListener::bind(addr).await?;
    info!("snowball HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/snowball");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn snowball_get_handler(query: Result<Query<SnowballPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => snowball_handler_impl(payload),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn snowball_post_handler(payload: Result<Json<SnowballPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => snowball_handler_impl(payload),
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

fn snowball_handler_impl(payload: SnowballPayload) -> Response {
    match plan_request_from_payload(payload) {
        Ok(request) => json_response(StatusCode::OK, run_plan(request)),
        Err(err) => plan_error_response(&err),
    }
}

fn profile_response(user_id: String, stored: bool, profile: UserProfile) -> Response {
    json_response(
        StatusCode::OK,
        ProfileResponse {
            user_id,
            stored,
            profile,
        },
    )
}

fn load_or_sample(state: &AppState, user_id: &str) -> Result<UserProfile, PlanError> {
    Ok(state
        .profiles
        .load(user_id)?
        .unwrap_or_else(UserProfile::sample))
}

async fn get_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.profiles.load(&user_id) {
        Ok(Some(profile)) => profile_response(user_id, true, profile),
        Ok(None) => profile_response(user_id, false, UserProfile::sample()),
        Err(err) => plan_error_response(&err),
    }
}

async fn put_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    profile: Result<Json<UserProfile>, JsonRejection>,
) -> Response {
    let profile = match profile {
        Ok(Json(profile)) => profile,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };

    match state.profiles.save(&user_id, profile) {
        Ok(profile) => profile_response(user_id, true, profile),
        Err(err) => plan_error_response(&err),
    }
}

async fn add_debt_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    let result = load_or_sample(&state, &user_id).and_then(|mut profile| {
        profile.add_debt();
        state.profiles.save(&user_id, profile)
    });

    match result {
        Ok(profile) => profile_response(user_id, true, profile),
        Err(err) => plan_error_response(&err),
    }
}

async fn remove_debt_handler(
    State(state): State<AppState>,
    path: Result<Path<(String, usize)>, PathRejection>,
) -> Response {
    let (user_id, index) = match path {
        Ok(Path(params)) => params,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };

    let result = load_or_sample(&state, &user_id).and_then(|mut profile| {
        let removed = profile.remove_debt(index)?;
        info!("removing debt {:?} from profile {user_id}", removed.name);
        state.profiles.save(&user_id, profile)
    });

    match result {
        Ok(profile) => profile_response(user_id, true, profile),
        Err(err) => plan_error_response(&err),
    }
}

async fn profile_plan_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<ProfilePlanQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };

    let planned = parse_order(query.order.as_deref()).and_then(|order| {
        let profile = load_or_sample(&state, &user_id)?;
        Ok(plan_response(
            profile.plan(order),
            order,
            profile.planned_contribution(),
        ))
    });

    match planned {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => plan_error_response(&err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
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

fn rejection_response(body_text: String) -> Response {
    plan_error_response(&PlanError::InvalidRequest(body_text))
}

fn plan_error_response(err: &PlanError) -> Response {
    let status = match err {
        PlanError::NoSuchDebt(_) => StatusCode::NOT_FOUND,
        err if err.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("request failed with {status}: {err}");
    error_response(status, &err.to_string())
}
