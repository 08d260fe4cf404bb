//! HTTP Endpoints
//!
//! `POST /text-to-speech` plus voice listing, health and metrics.
//!
//! `text` and `voiceChoice` are read from the multipart form and, failing
//! that, from the query string. A form value always wins.

use std::time::Instant;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::QueryRejection,
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use voice_tts_config::ServerConfig;
use voice_tts_core::{SynthesisRequest, UploadedReference};

use crate::metrics::{self, metrics_handler};
use crate::state::AppState;
use crate::ServerError;

/// Form field names
pub const TEXT_FIELD: &str = "text";
pub const REFERENCE_FIELD: &str = "referenceWavFile";
pub const VOICE_FIELD: &str = "voiceChoice";

/// Header naming the style source used for the response
pub const VOICE_SOURCE_HEADER: &str = "x-voice-source";

/// Query-string fallbacks for the form fields
#[derive(Debug, Default, Deserialize)]
pub struct TextToSpeechQuery {
    pub text: Option<String>,
    #[serde(rename = "voiceChoice")]
    pub voice_choice: Option<String>,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;

    let mut router = Router::new()
        .route("/text-to-speech", post(text_to_speech))
        .route("/voices", get(list_voices))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // Middleware
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server.max_upload_bytes));

    if server.cors_enabled {
        router = router.layer(cors_layer(server));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() || server.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(VOICE_SOURCE_HEADER),
        ])
}

/// Synthesize speech from a multipart form or query string
async fn text_to_speech(
    State(state): State<AppState>,
    query: Result<Query<TextToSpeechQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ServerError> {
    let started = Instant::now();

    let request = match query {
        Ok(Query(query)) => read_request(multipart, query).await,
        Err(rejection) => Err(ServerError::InvalidRequest(rejection.body_text())),
    }
    .inspect_err(|_| metrics::record_request("client_error"))?;

    let service = state.service.clone();
    let rendered = tokio::task::spawn_blocking(move || service.render(&request))
        .await
        .map_err(|e| {
            metrics::record_request("server_error");
            ServerError::Internal(format!("synthesis task failed: {}", e))
        })?
        .map_err(|e| {
            metrics::record_error(e.kind());
            metrics::record_request(if e.is_client_error() { "client_error" } else { "server_error" });
            ServerError::from(e)
        })?;

    metrics::record_request("ok");
    metrics::record_synthesis_latency(started.elapsed().as_secs_f64());
    metrics::record_audio_duration(rendered.duration_secs);

    let headers = [
        (header::CONTENT_TYPE, "audio/wav".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", rendered.file.filename),
        ),
        (HeaderName::from_static(VOICE_SOURCE_HEADER), rendered.source.label()),
    ];
    Ok((StatusCode::OK, headers, rendered.bytes).into_response())
}

/// Build the request from the form, filling gaps from the query string.
///
/// A body that is absent or not multipart counts as an empty form.
async fn read_request(
    multipart: Result<Multipart, MultipartRejection>,
    query: TextToSpeechQuery,
) -> Result<SynthesisRequest, ServerError> {
    let form = match multipart {
        Ok(multipart) => read_form(multipart).await?,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "No multipart form in request");
            FormFields::default()
        }
    };

    let text = form
        .text
        .or(query.text)
        .ok_or(ServerError::MissingField(TEXT_FIELD))?;
    let mut request = SynthesisRequest::new(text);
    request.reference = form.reference;
    request.voice = form.voice.or(query.voice_choice);
    Ok(request)
}

#[derive(Default)]
struct FormFields {
    text: Option<String>,
    reference: Option<UploadedReference>,
    voice: Option<String>,
}

/// Collect the form fields. Unknown fields are ignored.
async fn read_form(mut multipart: Multipart) -> Result<FormFields, ServerError> {
    let mut text = None;
    let mut reference = None;
    let mut voice = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            TEXT_FIELD => text = Some(field.text().await.map_err(multipart_error)?),
            REFERENCE_FIELD => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                reference = Some(UploadedReference::new(filename, bytes.to_vec()));
            }
            VOICE_FIELD => voice = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(FormFields {
        text,
        reference,
        voice,
    })
}

fn multipart_error(err: MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge
    } else {
        ServerError::InvalidRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// List catalog voices
async fn list_voices(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.service.cache();
    Json(serde_json::json!({
        "voices": cache.voices(),
        "default": cache.default_voice(),
    }))
}

/// Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "voices": state.service.cache().len(),
    }))
}
