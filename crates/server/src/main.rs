// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP server for Rideline.
//!
//! A thin axum binary over the API crate: routing, session extraction, and
//! the mapping from the API error taxonomy to HTTP status codes. All
//! behavior lives in the api/core/persistence crates.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Iso8601;
use tokio::sync::Mutex;
use tracing::{error, info};

use rideline_api::{
    ApiError, AuthError, AuthenticationService, ChangePasswordRequest, ChangePasswordResponse,
    CreateAccountRequest, CreateAccountResponse, CreateRideEventRequest, CreateRideRequest,
    ListAvailableDriversResponse, ListRideEventsResponse, ListRidesRequest, ListRidesResponse,
    LoginRequest, LoginResponse, RegisterAccountRequest, RegisterAccountResponse, RideEventInfo,
    RideInfo, TripDurationReportResponse, UpdateRideRequest, WhoAmIResponse,
};
use rideline_persistence::{Persistence, PersistenceError};

use crate::session::SessionUser;

/// Rideline Server - HTTP server for the Rideline ride-booking system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// `MySQL`/`MariaDB` connection URL. Takes precedence over --database.
    #[arg(long)]
    mysql_url: Option<String>,

    /// Order distance listings with the database-native spherical-distance
    /// function. Requires --mysql-url.
    #[arg(long, default_value_t = false)]
    native_distance: bool,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Username of an admin account to create at startup if missing.
    #[arg(long)]
    bootstrap_admin: Option<String>,

    /// Email for the bootstrap admin account.
    #[arg(long, default_value = "admin@rideline.local")]
    bootstrap_admin_email: String,

    /// Password for the bootstrap admin account. Required with --bootstrap-admin.
    #[arg(long)]
    bootstrap_admin_password: Option<String>,
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for accounts, sessions, rides, and events.
    persistence: Arc<Mutex<Persistence>>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// Response for operations that only confirm success.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    /// Success indicator.
    success: bool,
    /// A human-readable message.
    message: String,
}

/// Query parameters for listing rides.
#[derive(Debug, Deserialize)]
struct ListRidesQuery {
    /// Exact-match status filter.
    status: Option<String>,
    /// Case-insensitive substring filter on the rider's email.
    email: Option<String>,
    /// Ordering: `pickup_time` or `distance`.
    order_by: Option<String>,
    /// Reference latitude for distance ordering.
    latitude: Option<f64>,
    /// Reference longitude for distance ordering.
    longitude: Option<f64>,
    /// 1-based page number.
    page: Option<u32>,
    /// Page size.
    page_size: Option<u32>,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::ValidationFailure { .. } | ApiError::MissingParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::PasswordPolicyViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        let status: StatusCode = match &err {
            AuthError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            AuthError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for HttpError {
    fn from(err: PersistenceError) -> Self {
        error!(error = %err, "Persistence error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Persistence error: {err}"),
        }
    }
}

/// Handler for POST `/accounts/register` endpoint.
///
/// Registers a new rider account; no authentication required.
async fn handle_register_account(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterAccountRequest>,
) -> Result<Json<RegisterAccountResponse>, HttpError> {
    info!(username = %req.username, "Handling register_account request");

    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::register_account(&mut persistence, req)?;
    Ok(Json(response))
}

/// Handler for POST `/accounts` endpoint.
///
/// Creates an account with an explicit role (admin only).
async fn handle_create_account(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<CreateAccountResponse>, HttpError> {
    info!(
        username = %req.username,
        role = %req.role,
        created_by = %actor.username,
        "Handling create_account request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::create_account(&mut persistence, req, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/accounts/password` endpoint.
///
/// Changes the caller's own password and invalidates every session.
async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, HttpError> {
    info!(username = %actor.username, "Handling change_password request");

    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::change_password(&mut persistence, req, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/auth/login` endpoint.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(username = %req.username, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let (session_token, actor) =
        AuthenticationService::login(&mut persistence, &req.username, &req.password)?;

    Ok(Json(LoginResponse {
        session_token,
        user_id: actor.user_id,
        username: actor.username,
        role: actor.role.as_str().to_string(),
    }))
}

/// Handler for POST `/auth/logout` endpoint.
///
/// Deletes the presented session.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, HttpError> {
    let token: &str = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| HttpError {
            status: StatusCode::UNAUTHORIZED,
            message: String::from("Missing or malformed Authorization header"),
        })?;

    let mut persistence = app_state.persistence.lock().await;
    AuthenticationService::logout(&mut persistence, token)?;

    Ok(Json(MessageResponse {
        success: true,
        message: String::from("Logged out"),
    }))
}

/// Handler for GET `/auth/whoami` endpoint.
async fn handle_whoami(SessionUser(actor): SessionUser) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        user_id: actor.user_id,
        username: actor.username,
        role: actor.role.as_str().to_string(),
    })
}

/// Handler for GET `/rides` endpoint.
///
/// Lists rides with filtering, ordering, scope restriction, and pagination.
async fn handle_list_rides(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    Query(query): Query<ListRidesQuery>,
) -> Result<Json<ListRidesResponse>, HttpError> {
    info!(
        username = %actor.username,
        status = ?query.status,
        order_by = ?query.order_by,
        "Handling list_rides request"
    );

    let request: ListRidesRequest = ListRidesRequest {
        status: query.status,
        email: query.email,
        order_by: query.order_by,
        latitude: query.latitude,
        longitude: query.longitude,
        page: query.page,
        page_size: query.page_size,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::list_rides(&mut persistence, request, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/rides` endpoint.
async fn handle_create_ride(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    Json(req): Json<CreateRideRequest>,
) -> Result<Json<RideInfo>, HttpError> {
    info!(
        rider_id = req.rider_id,
        driver_id = req.driver_id,
        booked_by = %actor.username,
        "Handling create_ride request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::create_ride(&mut persistence, req, &actor)?;
    Ok(Json(response))
}

/// Handler for GET `/rides/{ride_id}` endpoint.
async fn handle_get_ride(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    Path(ride_id): Path<i64>,
) -> Result<Json<RideInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::get_ride(&mut persistence, ride_id, &actor)?;
    Ok(Json(response))
}

/// Handler for PATCH `/rides/{ride_id}` endpoint.
///
/// Applies a guarded ride update; fields the current status marks read-only
/// are silently reverted, and the lifecycle rule stamps timestamps and flips
/// driver availability.
async fn handle_update_ride(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    Path(ride_id): Path<i64>,
    Json(req): Json<UpdateRideRequest>,
) -> Result<Json<RideInfo>, HttpError> {
    info!(
        ride_id,
        status = ?req.status,
        updated_by = %actor.username,
        "Handling update_ride request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::update_ride(&mut persistence, ride_id, req, &actor)?;
    Ok(Json(response))
}

/// Handler for GET `/rides/{ride_id}/events` endpoint.
async fn handle_list_ride_events(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    Path(ride_id): Path<i64>,
) -> Result<Json<ListRideEventsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::list_ride_events(&mut persistence, ride_id, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/rides/{ride_id}/events` endpoint.
async fn handle_create_ride_event(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    Path(ride_id): Path<i64>,
    Json(req): Json<CreateRideEventRequest>,
) -> Result<Json<RideEventInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::create_ride_event(&mut persistence, ride_id, req, &actor)?;
    Ok(Json(response))
}

/// Handler for GET `/drivers/available` endpoint.
async fn handle_list_available_drivers(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor): SessionUser,
) -> Result<Json<ListAvailableDriversResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::list_available_drivers(&mut persistence)?;
    Ok(Json(response))
}

/// Handler for GET `/reports/trips-over-one-hour` endpoint.
async fn handle_trip_report(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
) -> Result<Json<TripDurationReportResponse>, HttpError> {
    info!(username = %actor.username, "Handling trip_duration_report request");

    let mut persistence = app_state.persistence.lock().await;
    let response = rideline_api::trip_duration_report(&mut persistence, &actor)?;
    Ok(Json(response))
}

/// Builds the application router.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/accounts/register", post(handle_register_account))
        .route("/accounts", post(handle_create_account))
        .route("/accounts/password", post(handle_change_password))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/whoami", get(handle_whoami))
        .route("/rides", get(handle_list_rides))
        .route("/rides", post(handle_create_ride))
        .route("/rides/{ride_id}", get(handle_get_ride))
        .route("/rides/{ride_id}", patch(handle_update_ride))
        .route("/rides/{ride_id}/events", get(handle_list_ride_events))
        .route("/rides/{ride_id}/events", post(handle_create_ride_event))
        .route("/drivers/available", get(handle_list_available_drivers))
        .route("/reports/trips-over-one-hour", get(handle_trip_report))
        .with_state(app_state)
}

/// Creates the bootstrap admin account at startup if it does not exist.
fn bootstrap_admin(
    persistence: &mut Persistence,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if persistence.get_account_by_username(username)?.is_some() {
        info!(username, "Bootstrap admin account already exists");
        return Ok(());
    }

    let created_at: String = OffsetDateTime::now_utc().format(&Iso8601::DEFAULT)?;
    let user_id: i64 =
        persistence.create_account(username, email, password, "admin", &created_at)?;
    info!(user_id, username, "Bootstrap admin account created");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Rideline Server");

    if args.native_distance && args.mysql_url.is_none() {
        return Err("--native-distance requires --mysql-url".into());
    }

    // Initialize persistence based on CLI arguments
    let mut persistence: Persistence = if let Some(mysql_url) = &args.mysql_url {
        info!("Using MySQL database");
        let mut persistence = Persistence::new_with_mysql(mysql_url)?;
        if args.native_distance {
            persistence.enable_native_distance()?;
            info!("Native spherical-distance ordering enabled");
        }
        persistence
    } else if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    // Create the first admin account if requested
    if let Some(admin_username) = &args.bootstrap_admin {
        let password = args
            .bootstrap_admin_password
            .as_deref()
            .ok_or("--bootstrap-admin requires --bootstrap-admin-password")?;
        bootstrap_admin(
            &mut persistence,
            admin_username,
            &args.bootstrap_admin_email,
            password,
        )?;
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
