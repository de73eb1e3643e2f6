use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use super::AppState;
use crate::components::automation::{
    FillReport, FillRequest, FormFiller, PeriodRequest, PortalTask,
};
use crate::components::credentials::Credentials;
use crate::components::schedule::{generate_daily_schedule_with, validate_hours, GeneratedSchedule};
use crate::error::Error;

/// Most days a single generate call may ask for
const MAX_GENERATED_DAYS: usize = 31;

/// Error returned to API clients as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::Format(_) | Error::Date(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default = "default_days")]
    pub days: usize,
}

fn default_days() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub schedules: Vec<GeneratedSchedule>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub morning_start: String,
    pub morning_end: String,
    pub afternoon_start: String,
    pub afternoon_end: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadTasksRequest {
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Serialize)]
pub struct LoadTasksResponse {
    pub success: bool,
    pub tasks: Vec<PortalTask>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub periods: Vec<PeriodRequest>,
}

/// Handler for the root path
pub async fn root_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok", "message": "Timesheet autofill API" }))
}

/// Handler for health checks
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Backend is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Generate schedules for one or more days
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if request.days == 0 || request.days > MAX_GENERATED_DAYS {
        return Err(ApiError::bad_request(format!(
            "days must be between 1 and {}",
            MAX_GENERATED_DAYS
        )));
    }

    let mut rng = state.rng.lock().await;
    let schedules = (0..request.days)
        .map(|_| generate_daily_schedule_with(&mut *rng))
        .collect();

    Ok(Json(GenerateResponse { schedules }))
}

/// Validate hours typed in by the operator
pub async fn validate_handler(
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let (valid, reason) = validate_hours(
        &request.morning_start,
        &request.morning_end,
        &request.afternoon_start,
        &request.afternoon_end,
    )?;

    Ok(Json(ValidateResponse { valid, reason }))
}

/// Store the portal login
pub async fn save_credentials_handler(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    if !state.secrets.save(&credentials).await {
        error!("Failed to save credentials for {}", credentials.email);
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save credentials",
        ));
    }

    Ok(Json(json!({ "success": true, "message": "Credentials saved" })))
}

/// Forget the stored portal login
pub async fn delete_credentials_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.secrets.delete().await {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to delete credentials",
        ));
    }

    Ok(Json(json!({ "success": true, "message": "Credentials deleted" })))
}

/// Report whether a login is stored, without exposing the password
pub async fn load_credentials_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.secrets.load().await {
        Some(credentials) => Json(json!({
            "success": true,
            "has_credentials": true,
            "email": credentials.email,
        })),
        None => Json(json!({ "success": true, "has_credentials": false })),
    }
}

/// Log in and read the task table for a month
pub async fn load_tasks_handler(
    State(state): State<AppState>,
    Json(request): Json<LoadTasksRequest>,
) -> Result<Json<LoadTasksResponse>, ApiError> {
    if !(1..=12).contains(&request.month) {
        return Err(ApiError::bad_request("month must be between 1 and 12"));
    }

    let credentials = stored_credentials(&state).await?;
    let mut driver = state.driver.lock().await;

    driver
        .login(&credentials.email, &credentials.password)
        .await
        .map_err(|e| ApiError::new(StatusCode::UNAUTHORIZED, format!("Login failed: {}", e)))?;

    driver
        .navigate_to_entries(Some((request.month, request.year)))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to open entries page: {}", e),
            )
        })?;

    let tasks = driver.load_tasks().await?;
    if tasks.is_empty() {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "No tasks found"));
    }

    info!("Loaded {} tasks for {:02}/{}", tasks.len(), request.month, request.year);
    Ok(Json(LoadTasksResponse {
        success: true,
        count: tasks.len(),
        tasks,
    }))
}

/// Fill every submitted period, leaving the final save to the operator
pub async fn execute_handler(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<FillReport>, ApiError> {
    let credentials = stored_credentials(&state).await?;
    let mut driver = state.driver.lock().await;

    driver
        .login(&credentials.email, &credentials.password)
        .await
        .map_err(|e| ApiError::new(StatusCode::UNAUTHORIZED, format!("Login failed: {}", e)))?;

    let rng = StdRng::from_rng(&mut *state.rng.lock().await);
    let mut filler = FormFiller::new(&mut **driver)
        .with_rng(rng)
        .with_step_delay(state.config.step_delay());

    let mut report = FillReport::default();
    for period in &request.periods {
        match FillRequest::try_from(period) {
            Ok(fill_request) => report.merge(filler.fill_date_range(&fill_request).await),
            Err(e) => {
                warn!("Skipping period {} - {}: {}", period.from, period.to, e);
                report.fail(format!("Invalid period {} - {}: {}", period.from, period.to, e));
            }
        }
    }

    info!(
        "Automation finished: {} dates, {} entries, {} errors",
        report.filled_dates.len(),
        report.total_entries,
        report.errors.len()
    );
    Ok(Json(report))
}

/// Whether an automation run currently holds the browser
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    // A run holds the lock for its whole length, so its browser is open
    let (running, browser_open) = match state.driver.try_lock() {
        Ok(driver) => (false, driver.session_open()),
        Err(_) => (true, true),
    };

    Json(json!({
        "running": running,
        "browser_open": browser_open,
        "headless": state.config.headless,
    }))
}

async fn stored_credentials(state: &AppState) -> Result<Credentials, ApiError> {
    state
        .secrets
        .load()
        .await
        .ok_or_else(|| ApiError::bad_request("No stored credentials"))
}
