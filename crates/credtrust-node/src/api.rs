//! HTTP API server for the CredTrust node.
//!
//! Provides REST endpoints for issuer registration, credential issuance,
//! verification, revocation, and status lookups.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use credtrust_credentials::{
    Credential, IssueRequest, Issuer, RevocationReceipt, RevocationStatus, TrustError,
    VerificationResult,
};
use credtrust_crypto::Jwk;

use crate::state::AppState;

// --- Request / response types ---

#[derive(Deserialize)]
pub struct RegisterIssuerRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct VerifyCredentialRequest {
    pub token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeCredentialRequest {
    pub credential_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerResponse {
    pub identifier: String,
    pub name: String,
    pub algorithm: String,
    /// Hex-encoded public key.
    pub public_key: String,
    pub public_key_jwk: Jwk,
    pub created_at: String,
}

impl From<Issuer> for IssuerResponse {
    fn from(issuer: Issuer) -> Self {
        Self {
            identifier: issuer.identifier.to_string(),
            name: issuer.name,
            algorithm: issuer.public_key.algorithm().to_string(),
            public_key: issuer.public_key.to_hex(),
            public_key_jwk: issuer.public_key.to_jwk(),
            created_at: issuer.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct IssuersResponse {
    pub issuers: Vec<IssuerResponse>,
    pub count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatusResponse {
    pub credential_id: String,
    pub status: RevocationStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: String,
    pub storage_backend: String,
    pub issuer_count: usize,
    pub credential_count: usize,
    pub unique_issuer_names: bool,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable error name.
    pub kind: String,
}

/// Error body of the verify endpoint; a failure is never a positive verdict.
#[derive(Serialize)]
pub struct VerifyErrorResponse {
    pub valid: bool,
    pub reason: String,
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn status_for(e: &TrustError) -> StatusCode {
    match e {
        TrustError::InvalidName(_)
        | TrustError::InvalidHolder(_)
        | TrustError::MalformedToken(_)
        | TrustError::UnsupportedAlgorithm(_) => StatusCode::BAD_REQUEST,
        TrustError::UnknownIssuer(_) | TrustError::UnknownCredential(_) => StatusCode::NOT_FOUND,
        TrustError::IssuerAlreadyExists(_) | TrustError::DuplicateCredential(_) => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(e: TrustError) -> ApiError {
    let status = status_for(&e);
    if status.is_server_error() {
        tracing::error!(error = %e, kind = e.kind(), "request failed");
    } else {
        tracing::debug!(error = %e, kind = e.kind(), "request rejected");
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            kind: e.kind().to_string(),
        }),
    )
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let issuer_count = state.service.issuers().await.map_err(api_error)?.len();
    let credential_count = state.service.credential_count().await.map_err(api_error)?;
    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage_backend: state.backend.to_string(),
        issuer_count,
        credential_count,
        unique_issuer_names: state.service.policy().unique_issuer_names,
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}

async fn handle_register_issuer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterIssuerRequest>,
) -> Result<Json<IssuerResponse>, ApiError> {
    let issuer = state
        .service
        .register_issuer(&req.name)
        .await
        .map_err(api_error)?;
    Ok(Json(issuer.into()))
}

async fn handle_list_issuers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IssuersResponse>, ApiError> {
    let issuers: Vec<IssuerResponse> = state
        .service
        .issuers()
        .await
        .map_err(api_error)?
        .into_iter()
        .map(IssuerResponse::from)
        .collect();
    let count = issuers.len();
    Ok(Json(IssuersResponse { issuers, count }))
}

async fn handle_get_issuer(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> Result<Json<IssuerResponse>, ApiError> {
    let issuer = state.service.issuer(&identifier).await.map_err(api_error)?;
    Ok(Json(issuer.into()))
}

async fn handle_issue_credential(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueRequest>,
) -> Result<Json<Credential>, ApiError> {
    let credential = state
        .service
        .issue_credential(req)
        .await
        .map_err(api_error)?;
    Ok(Json(credential))
}

async fn handle_verify_credential(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyCredentialRequest>,
) -> Result<Json<VerificationResult>, (StatusCode, Json<VerifyErrorResponse>)> {
    state
        .service
        .verify_credential(&req.token)
        .await
        .map(Json)
        .map_err(|e| {
            let (status, Json(body)) = api_error(e);
            (
                status,
                Json(VerifyErrorResponse {
                    valid: false,
                    reason: body.kind,
                    error: body.error,
                }),
            )
        })
}

async fn handle_revoke_credential(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RevokeCredentialRequest>,
) -> Result<Json<RevocationReceipt>, ApiError> {
    let receipt = state
        .service
        .revoke_credential(&req.credential_id)
        .await
        .map_err(api_error)?;
    Ok(Json(receipt))
}

async fn handle_credential_status(
    State(state): State<Arc<AppState>>,
    Path(credential_id): Path<String>,
) -> Result<Json<CredentialStatusResponse>, ApiError> {
    let status = state
        .service
        .status_of(&credential_id)
        .await
        .map_err(api_error)?;
    Ok(Json(CredentialStatusResponse {
        credential_id,
        status,
    }))
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route(
            "/api/v1/issuers",
            get(handle_list_issuers).post(handle_register_issuer),
        )
        .route("/api/v1/issuers/{identifier}", get(handle_get_issuer))
        .route("/api/v1/credentials/issue", post(handle_issue_credential))
        .route("/api/v1/credentials/verify", post(handle_verify_credential))
        .route("/api/v1/credentials/revoke", post(handle_revoke_credential))
        .route(
            "/api/v1/credentials/{id}/status",
            get(handle_credential_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_api_server(listen_addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
