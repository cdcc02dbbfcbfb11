use super::types::{ActivateCredentialRequest, CredentialStatus};
use crate::{
    Error, ErrorKind, ErrorReport,
    credential::{CredentialProvider, SharedCredential},
    generation::{GenerationResponse, LectureInfo, PostGenerator},
    slot::{GenerationSlot, SlotSnapshot, Ticket},
};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PostGenerator>,
    pub slot: Arc<Mutex<GenerationSlot>>,
    pub credential: Arc<SharedCredential>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorReport>)>;

impl AppState {
    pub fn new(generator: PostGenerator, credential: Arc<SharedCredential>) -> Self {
        Self {
            generator: Arc::new(generator),
            slot: Arc::new(Mutex::new(GenerationSlot::new())),
            credential,
        }
    }
}

pub async fn generate(
    State(state): State<AppState>,
    body: std::result::Result<Json<LectureInfo>, JsonRejection>,
) -> ApiResult<GenerationResponse> {
    let Json(info) = body.map_err(malformed_body).map_err(reject)?;
    info!("Received posting request for topic: {}", info.topic);

    let ticket = state.slot.lock().await.begin(info).map_err(reject)?;
    run(&state, ticket).await
}

pub async fn regenerate(State(state): State<AppState>) -> ApiResult<GenerationResponse> {
    info!("Received regenerate request");

    let ticket = state.slot.lock().await.regenerate().map_err(reject)?;
    run(&state, ticket).await
}

pub async fn latest(State(state): State<AppState>) -> Json<SlotSnapshot> {
    Json(state.slot.lock().await.snapshot())
}

pub async fn credential_status(State(state): State<AppState>) -> Json<CredentialStatus> {
    Json(CredentialStatus {
        active: state.credential.is_active(),
    })
}

pub async fn activate_credential(
    State(state): State<AppState>,
    body: std::result::Result<Json<ActivateCredentialRequest>, JsonRejection>,
) -> ApiResult<CredentialStatus> {
    let Json(request) = body.map_err(malformed_body).map_err(reject)?;
    state.credential.activate(request.api_key).map_err(reject)?;
    Ok(Json(CredentialStatus { active: true }))
}

pub async fn deactivate_credential(State(state): State<AppState>) -> ApiResult<CredentialStatus> {
    state.credential.deactivate().map_err(reject)?;
    Ok(Json(CredentialStatus {
        active: state.credential.is_active(),
    }))
}

pub async fn health() -> &'static str {
    "ok"
}

// The slot lock is released while the model call is outstanding
async fn run(state: &AppState, ticket: Ticket) -> ApiResult<GenerationResponse> {
    let outcome = state.generator.generate_posts(&ticket.info).await;

    let current = state.slot.lock().await.complete(&ticket, &outcome);
    if !current {
        info!(
            "Request {} finished after a newer one was issued",
            ticket.sequence
        );
    }

    match outcome {
        Ok(response) => {
            info!("Request {} completed", ticket.request_id);
            Ok(Json(response))
        }
        Err(e) => {
            error!("Request {} failed: {}", ticket.request_id, e);
            Err(reject(e))
        }
    }
}

// Any body the JSON extractor refuses is the caller's to fix
fn malformed_body(rejection: JsonRejection) -> Error {
    Error::input(rejection.body_text())
}

fn reject(e: Error) -> (StatusCode, Json<ErrorReport>) {
    let status = match e.kind() {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::Credential => StatusCode::UNAUTHORIZED,
        ErrorKind::Generation => StatusCode::BAD_GATEWAY,
    };
    if status != StatusCode::BAD_GATEWAY {
        warn!("Rejecting request with {}: {}", status, e);
    }
    (status, Json(e.report()))
}
