//! Simulator HTTP routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{SimulatorError, SimulatorResult},
    middleware::{CurrentUser, require_session},
    models::{AccountKind, NewSimulation, NewUser, SimulationRecord, User},
    retention,
    session::IssuedSession,
    state::AppState,
    validation::validate_biochar_percentage,
};

/// Request for account registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub kind: String,
}

/// Response for account registration
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Response carrying a session token
#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: User,
}

impl SessionResponse {
    fn new(session: IssuedSession, user: User) -> Self {
        Self {
            token: session.token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
            user,
        }
    }
}

/// Inputs of a simulation
#[derive(Deserialize)]
pub struct SimulationRequest {
    pub soil_type: String,
    pub biochar_percentage: f64,
}

/// Request for a password change
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Create the router for the simulator service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/simulate", post(run_simulation))
        .route("/simulations", get(list_simulations).post(save_simulation))
        .route("/simulations/:id", delete(delete_simulation))
        .route("/users/me", get(current_user).delete(delete_account))
        .route("/users/me/password", put(change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/external", get(external_login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage = state.users.health_check().await.unwrap_or(false);
    let status = if storage { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "biochar-simulator",
        "storage": storage,
    }))
}

/// Account registration endpoint
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, SimulatorError>,
) -> SimulatorResult<impl IntoResponse> {
    if [
        &payload.name,
        &payload.email,
        &payload.password,
        &payload.confirm_password,
        &payload.kind,
    ]
    .iter()
    .any(|field| field.trim().is_empty())
    {
        return Err(SimulatorError::InvalidInput(
            "name, email, password, confirm_password and kind are required".to_string(),
        ));
    }

    if payload.password != payload.confirm_password {
        return Err(SimulatorError::InvalidInput(
            "Password and confirmation do not match".to_string(),
        ));
    }

    let kind: AccountKind = payload.kind.parse()?;
    let id = state
        .users
        .register(NewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            kind,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, SimulatorError>,
) -> SimulatorResult<impl IntoResponse> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(SimulatorError::InvalidInput(
            "email and password are required".to_string(),
        ));
    }

    let user = state
        .users
        .verify_credentials(&payload.email, &payload.password)
        .await?;
    let session = state.sessions.issue(&user, payload.remember_me)?;
    info!("User {} logged in", user.id);

    Ok(Json(SessionResponse::new(session, user)))
}

/// Simulated government identity login
pub async fn external_login(State(state): State<AppState>) -> SimulatorResult<impl IntoResponse> {
    let profile = state.identity.authenticate().await?;
    let user = state
        .users
        .get_or_create_simulated_external_user(&profile)
        .await?;
    let session = state.sessions.issue(&user, false)?;
    info!(
        "User {} logged in through {}",
        user.id,
        state.identity.name()
    );

    Ok(Json(SessionResponse::new(session, user)))
}

fn validated_simulation(payload: &SimulationRequest) -> SimulatorResult<NewSimulation> {
    let biochar = validate_biochar_percentage(payload.biochar_percentage)?;
    retention::simulate(&payload.soil_type, biochar)
}

/// Compute a simulation without saving it
pub async fn run_simulation(
    WithRejection(Json(payload), _): WithRejection<Json<SimulationRequest>, SimulatorError>,
) -> SimulatorResult<Json<NewSimulation>> {
    Ok(Json(validated_simulation(&payload)?))
}

/// Compute and save a simulation for the current user
///
/// The result is recomputed from the inputs; clients cannot submit their own.
pub async fn save_simulation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    WithRejection(Json(payload), _): WithRejection<Json<SimulationRequest>, SimulatorError>,
) -> SimulatorResult<impl IntoResponse> {
    let simulation = validated_simulation(&payload)?;
    let record = state
        .simulations
        .create(Some(current.id), simulation)
        .await?;
    debug!(
        "Simulation {} saved for user {} (external: {})",
        record.id, current.id, current.external
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// List the current user's simulations, newest first
pub async fn list_simulations(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> SimulatorResult<Json<Vec<SimulationRecord>>> {
    Ok(Json(state.simulations.list_by_owner(current.id).await?))
}

/// Delete one of the current user's simulations
pub async fn delete_simulation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, SimulatorError>,
) -> SimulatorResult<StatusCode> {
    if state
        .simulations
        .delete_by_id_and_owner(id, current.id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SimulatorError::NotFoundOrNotOwned)
    }
}

/// Current account
pub async fn current_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> SimulatorResult<Json<User>> {
    state
        .users
        .find_by_id(current.id)
        .await?
        .map(Json)
        .ok_or(SimulatorError::Unauthorized)
}

/// Change the current user's password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    WithRejection(Json(payload), _): WithRejection<Json<ChangePasswordRequest>, SimulatorError>,
) -> SimulatorResult<StatusCode> {
    state
        .users
        .change_password(current.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete the current account and every simulation it owns
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> SimulatorResult<StatusCode> {
    if state.users.delete_account(current.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SimulatorError::Unauthorized)
    }
}
