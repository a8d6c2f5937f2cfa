//! REST API endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::avatar::{AvatarCommand, CommandOutcome};
use crate::error::TtsError;
use crate::output::sse;
use crate::AppState;

/// Header carrying base64-encoded word timings on TTS responses
pub const WORD_TIMINGS_HEADER: HeaderName = HeaderName::from_static("x-word-timings");

/// Larger timing payloads are dropped rather than sent as one header
pub const MAX_WORD_TIMINGS_HEADER_BYTES: usize = 8 * 1024;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn error(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        })
    }

    pub fn ok() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            error: None,
        })
    }
}

/// Map a command outcome to a response; ignored commands are 404s
fn command_response(outcome: CommandOutcome) -> Response {
    match outcome {
        CommandOutcome::Applied => ApiResponse::<()>::ok().into_response(),
        CommandOutcome::Ignored(e) => {
            (StatusCode::NOT_FOUND, ApiResponse::error(&e.to_string())).into_response()
        }
    }
}

/// JSON error for a request body axum could not extract
fn rejection_response(rejection: JsonRejection) -> Response {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    (rejection.status(), ApiResponse::error(&rejection.body_text())).into_response()
}

fn tts_error_response(e: &TtsError) -> Response {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, ApiResponse::error(&e.client_message())).into_response()
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub model_ready: bool,
    pub clips_ready: bool,
    pub current_clip: Option<String>,
    pub controls: usize,
    pub bones: usize,
    pub tts_configured: bool,
}

/// Get current status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let controller = state.controller.read().await;

    ApiResponse::success(StatusResponse {
        version: crate::VERSION.to_string(),
        model_ready: controller.model_ready(),
        clips_ready: controller.clips_ready(),
        current_clip: controller.current_clip().map(|s| s.to_string()),
        controls: controller.control_names().len(),
        bones: controller.bone_names().len(),
        tts_configured: state.tts.as_ref().is_some_and(|t| t.is_configured()),
    })
}

/// Get the current avatar frame
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ApiResponse::success(state.current_frame().await)
}

/// Everything a UI needs to build its controls
#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub expressions: Vec<String>,
    pub poses: Vec<String>,
    pub controls: Vec<String>,
    pub bones: Vec<String>,
    pub clips: Vec<String>,
}

pub async fn get_presets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let controller = state.controller.read().await;

    ApiResponse::success(PresetsResponse {
        expressions: controller.expression_names(),
        poses: controller.pose_names(),
        controls: controller.control_names(),
        bones: controller.bone_names(),
        clips: controller.clip_names(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SetControlRequest {
    pub name: String,
    pub value: f32,
}

pub async fn set_control(
    State(state): State<Arc<AppState>>,
    request: Result<Json<SetControlRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    command_response(
        state
            .execute(AvatarCommand::SetControl {
                name: request.name,
                value: request.value,
            })
            .await,
    )
}

#[derive(Debug, Deserialize)]
pub struct PresetRequest {
    pub preset: String,
}

pub async fn apply_expression(
    State(state): State<Arc<AppState>>,
    request: Result<Json<PresetRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    command_response(
        state
            .execute(AvatarCommand::ApplyExpression {
                preset: request.preset,
            })
            .await,
    )
}

#[derive(Debug, Deserialize)]
pub struct SetBoneRequest {
    pub bone: String,
    /// [x, y, z] in degrees
    pub rotation: [f32; 3],
}

pub async fn set_bone(
    State(state): State<Arc<AppState>>,
    request: Result<Json<SetBoneRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    command_response(
        state
            .execute(AvatarCommand::SetBoneRotation {
                bone: request.bone,
                degrees: request.rotation,
            })
            .await,
    )
}

pub async fn apply_pose(
    State(state): State<Arc<AppState>>,
    request: Result<Json<PresetRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    command_response(
        state
            .execute(AvatarCommand::ApplyBodyPose {
                preset: request.preset,
            })
            .await,
    )
}

#[derive(Debug, Deserialize)]
pub struct PlayAnimationRequest {
    pub clip: String,
}

pub async fn play_animation(
    State(state): State<Arc<AppState>>,
    request: Result<Json<PlayAnimationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    command_response(
        state
            .execute(AvatarCommand::PlayAnimation { clip: request.clip })
            .await,
    )
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Proxy a speech request; responds with MPEG audio and word timings
///
/// The API key is checked before the body, and an unreadable body is
/// reported like any other failed synthesis.
pub async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    request: Result<Json<TtsRequest>, JsonRejection>,
) -> Response {
    let Some(tts) = state.tts.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            ApiResponse::error("TTS is disabled"),
        )
            .into_response();
    };

    if !tts.is_configured() {
        tracing::error!("TTS request failed: {}", TtsError::MissingApiKey);
        return tts_error_response(&TtsError::MissingApiKey);
    }

    let text = match request {
        Ok(Json(request)) => request.text.unwrap_or_default(),
        Err(rejection) => {
            tracing::error!("Unreadable TTS request: {}", rejection.body_text());
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Failed to generate speech"),
            )
                .into_response();
        }
    };

    let speech = match tts.synthesize(&text).await {
        Ok(speech) => speech,
        Err(e) => {
            tracing::error!("TTS request failed: {}", e);
            return tts_error_response(&e);
        }
    };

    let word_count = speech.timings.words.len();
    let mut response = (
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_LENGTH, speech.audio.len().to_string()),
        ],
        speech.audio,
    )
        .into_response();

    match speech.timings.to_header_value() {
        Ok(encoded) if encoded.len() > MAX_WORD_TIMINGS_HEADER_BYTES => tracing::warn!(
            "Word timings for {} words ({} bytes) exceed the header limit, omitting",
            word_count,
            encoded.len()
        ),
        Ok(encoded) => match HeaderValue::from_str(&encoded) {
            Ok(value) => {
                response.headers_mut().insert(WORD_TIMINGS_HEADER, value);
            }
            Err(e) => tracing::warn!("Word timings are not a valid header: {}", e),
        },
        Err(e) => tracing::warn!("Failed to encode word timings: {}", e),
    }

    response
}

/// SSE stream endpoint
pub async fn frame_stream(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    sse::create_frame_stream(state)
}
