use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    Catalog, MortgageInput, OverpaymentConfig, RatePeriodConfig, SelfBuildConfig,
    SimulationResult, SimulationState, has_required_data, simulate,
};

/// Fifty years; lenders cap real terms well below this.
pub const MAX_TERM_MONTHS: u32 = 600;

#[derive(Parser, Debug)]
#[command(
    name = "mortgage-sim",
    about = "Mortgage amortization simulator (rate periods, overpayments, fee-free allowances, self-build drawdowns)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, help = "Catalog JSON with rates, customRates, lenders and policies")]
        catalog: Option<PathBuf>,
    },
    /// Simulate one scenario file and print the result as JSON
    Simulate {
        #[arg(long, help = "Scenario JSON: input, ratePeriods, overpaymentConfigs, selfBuild")]
        scenario: PathBuf,
        #[arg(long, help = "Catalog JSON; an inline scenario catalog takes precedence")]
        catalog: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input is required")]
    MissingInput,
    #[error("mortgageAmount must be > 0")]
    NonPositiveAmount,
    #[error("mortgageTermMonths must be > 0")]
    NonPositiveTerm,
    #[error("mortgageTermMonths must be <= {max}")]
    TermTooLong { max: u32 },
    #[error("propertyValue must be >= 0")]
    NegativePropertyValue,
    #[error("overpayment {id}: amount must be > 0")]
    NonPositiveOverpayment { id: String },
    #[error("overpayment {id}: endMonth {end_month} is before startMonth {start_month}")]
    EndBeforeStart {
        id: String,
        start_month: u32,
        end_month: u32,
    },
    #[error("drawdown stage {id}: amount must be > 0")]
    NonPositiveDrawdown { id: String },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    input: Option<MortgageInput>,
    rate_periods: Vec<RatePeriodConfig>,
    overpayment_configs: Vec<OverpaymentConfig>,
    self_build: Option<SelfBuildConfig>,
    catalog: Option<Catalog>,
}

#[derive(Debug)]
struct ApiRequest {
    state: SimulationState,
    catalog: Option<Catalog>,
}

impl ApiRequest {
    /// Inline catalog wins over the one the server was started with.
    fn catalog<'a>(&'a self, fallback: &'a Catalog) -> &'a Catalog {
        self.catalog.as_ref().unwrap_or(fallback)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    has_required_data: bool,
    #[serde(flatten)]
    result: SimulationResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn validate_state(state: &SimulationState) -> Result<(), InputError> {
    let input = &state.input;
    if input.mortgage_amount <= 0 {
        return Err(InputError::NonPositiveAmount);
    }

    if input.mortgage_term_months == 0 {
        return Err(InputError::NonPositiveTerm);
    }

    if input.mortgage_term_months > MAX_TERM_MONTHS {
        return Err(InputError::TermTooLong {
            max: MAX_TERM_MONTHS,
        });
    }

    if input.property_value < 0 {
        return Err(InputError::NegativePropertyValue);
    }

    for config in &state.overpayment_configs {
        if config.amount <= 0 {
            return Err(InputError::NonPositiveOverpayment {
                id: config.id.clone(),
            });
        }
        if let Some(end_month) = config.end_month {
            if end_month < config.start_month {
                return Err(InputError::EndBeforeStart {
                    id: config.id.clone(),
                    start_month: config.start_month,
                    end_month,
                });
            }
        }
    }

    if let Some(self_build) = &state.self_build {
        if let Some(stage) = self_build.drawdown_stages.iter().find(|s| s.amount <= 0) {
            return Err(InputError::NonPositiveDrawdown {
                id: stage.id.clone(),
            });
        }
    }

    Ok(())
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, InputError> {
    let input = payload.input.ok_or(InputError::MissingInput)?;
    let state = SimulationState {
        input,
        rate_periods: payload.rate_periods,
        overpayment_configs: payload.overpayment_configs,
        self_build: payload.self_build,
    };
    validate_state(&state)?;

    Ok(ApiRequest {
        state,
        catalog: payload.catalog,
    })
}

fn api_request_from_json(json: &str) -> Result<ApiRequest, InputError> {
    let payload = serde_json::from_str::<SimulatePayload>(json)?;
    api_request_from_payload(payload)
}

fn read_file(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Missing path means an empty catalog; every rate reference then fails to resolve.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, InputError> {
    let Some(path) = path else {
        return Ok(Catalog::default());
    };
    let catalog: Catalog = serde_json::from_str(&read_file(path)?)?;
    info!(
        path = %path.display(),
        rates = catalog.rates.len(),
        custom_rates = catalog.custom_rates.len(),
        lenders = catalog.lenders.len(),
        policies = catalog.policies.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

fn build_simulate_response(request: &ApiRequest, fallback: &Catalog) -> SimulateResponse {
    let catalog = request.catalog(fallback);
    SimulateResponse {
        has_required_data: has_required_data(&request.state),
        result: simulate(&request.state, catalog),
    }
}

pub fn run_simulate_command(
    scenario: &Path,
    catalog: Option<&Path>,
    pretty: bool,
) -> Result<String, InputError> {
    let fallback = load_catalog(catalog)?;
    let request = api_request_from_json(&read_file(scenario)?)?;
    let response = build_simulate_response(&request, &fallback);
    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    Ok(json)
}

pub async fn run(cli: Cli) -> Result<(), RunError> {
    match cli.command {
        Command::Serve { port, catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            run_http_server(port, catalog).await?;
        }
        Command::Simulate {
            scenario,
            catalog,
            pretty,
        } => {
            let json = run_simulate_command(&scenario, catalog.as_deref(), pretty)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn router(catalog: Catalog) -> Router {
    Router::new()
        .route("/api/simulate", post(simulate_handler))
        .route("/api/catalog", get(catalog_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(catalog))
}

pub async fn run_http_server(port: u16, catalog: Catalog) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(catalog);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "mortgage simulator API listening");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn catalog_handler(State(catalog): State<Arc<Catalog>>) -> Response {
    json_response(StatusCode::OK, catalog.as_ref())
}

async fn simulate_handler(
    State(catalog): State<Arc<Catalog>>,
    payload: Result<Json<SimulatePayload>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let request = match payload {
        Ok(Json(payload)) => api_request_from_payload(payload),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };
    let request = match request {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    let response = build_simulate_response(&request, &catalog);
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        months = response.result.months.len(),
        warnings = response.result.warnings.len(),
        issues = response.result.resolve_issues.len(),
        "simulate request served"
    );
    json_response(StatusCode::OK, response)
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
