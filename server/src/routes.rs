use std::path::PathBuf;

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{header, HeaderValue, Method, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tts_core::SynthesisRequest;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::metrics::{MetricsResponse, SystemMetrics};
use crate::pages;
use crate::params::{first_value, non_empty, parse_form, read_form, RequestParams};
use crate::service::ReferenceVoice;
use crate::state::AppState;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// All routes, without deployment middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/details", get(details))
        .route("/api/tts", get(api_tts).post(api_tts))
        .route("/locales", get(marytts_locales))
        .route("/voices", get(marytts_voices))
        .route("/process", get(marytts_process).post(marytts_process))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let value = HeaderValue::from_str(&request_id).ok();
    if let Some(v) = &value {
        request.headers_mut().insert("x-request-id", v.clone());
    }
    let mut response = next.run(request).await;
    if let Some(v) = value {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
        .allow_credentials(false);

    match &config.cors_allowed_origins {
        Some(allowed) => {
            let origins: Vec<HeaderValue> = allowed
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect();
            if origins.is_empty() {
                warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
                base.allow_origin(tower_http::cors::Any)
            } else {
                info!("CORS configured for {} origin(s)", origins.len());
                base.allow_origin(tower_http::cors::AllowOrigin::list(origins))
            }
        }
        None => base.allow_origin(tower_http::cors::Any),
    }
}

/// Wrap the router with request ids and CORS.
pub fn with_middleware(router: Router, config: &ServerConfig) -> Router {
    router
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(ServiceBuilder::new().layer(cors_layer(config)).into_inner())
}

fn wav_response(wav: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "audio/wav")], wav).into_response()
}

async fn run_synthesis<F>(
    state: &AppState,
    build: F,
    reference: ReferenceVoice,
) -> Result<Vec<u8>, ApiError>
where
    F: FnOnce() -> SynthesisRequest + Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || service.synthesize_wav_with(build, reference))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {e}")))?
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(pages::render_index(
        state.settings.args.show_details,
        state.service.capabilities(),
    ))
}

pub async fn details(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let load = |path: Option<PathBuf>| -> Result<Option<serde_json::Value>, ApiError> {
        path.map(|p| tts_core::config::load_config(&p))
            .transpose()
            .map_err(|e| ApiError::Internal(format!("{e:#}")))
    };

    let model_config = load(state.settings.model_config_path())?;
    let vocoder_config = load(state.settings.vocoder_config_path())?;
    let args = serde_json::to_value(&state.settings.args)
        .map_err(|e| ApiError::Internal(format!("cannot serialize args: {e}")))?;

    Ok(Html(pages::render_details(
        state.settings.args.show_details,
        model_config.as_ref(),
        vocoder_config.as_ref(),
        &args,
    )))
}

pub async fn api_tts(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    request: Request,
) -> Result<Response, ApiError> {
    let headers = request.headers().clone();
    let form = read_form(request).await?;

    let build = move || {
        let params = RequestParams::new(&headers, &query, &form);
        let text = params.get("text", "text");
        let speaker_idx = params.get("speaker-id", "speaker_id");
        let language_idx = params.get("language-id", "language_id");
        let style_wav = params.get("style-wav", "style_wav");

        info!(" > Model input: {}", text);
        info!(" > Speaker Idx: {}", speaker_idx);
        info!(" > Language Idx: {}", language_idx);

        SynthesisRequest {
            text,
            speaker: non_empty(speaker_idx),
            language: non_empty(language_idx),
            style_wav: non_empty(style_wav).map(PathBuf::from),
            reference_wav: None,
        }
    };

    let wav = run_synthesis(&state, build, ReferenceVoice::ModelDir).await?;
    Ok(wav_response(wav))
}

/// `[_, locale, _, name]` from a `<type>/<locale>/<dataset>/<name>` model name.
pub fn marytts_details(model_name: Option<&str>) -> [String; 4] {
    let fallback = || ["", "en", "", "default"].map(String::from);
    let Some(name) = model_name else {
        return fallback();
    };
    let parts: Vec<&str> = name.split('/').collect();
    if parts.len() < 4 {
        return fallback();
    }
    [parts[0], parts[1], parts[2], parts[3]].map(String::from)
}

pub async fn marytts_locales(State(state): State<AppState>) -> impl IntoResponse {
    let details = marytts_details(state.settings.args.model_name.as_deref());
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], format!("{}\n", details[1]))
}

pub async fn marytts_voices(State(state): State<AppState>) -> impl IntoResponse {
    let details = marytts_details(state.settings.args.model_name.as_deref());
    (
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        format!("{} {} {}\n", details[3], details[1], "u"),
    )
}

pub async fn marytts_process(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let build = move || {
        let text = if method == Method::POST {
            let form = parse_form(&body);
            first_value(&form, "INPUT_TEXT").unwrap_or("").to_string()
        } else {
            first_value(&query, "INPUT_TEXT").unwrap_or("").to_string()
        };
        info!(" > Model input: {}", text);
        SynthesisRequest::new(text)
    };

    let wav = run_synthesis(&state, build, ReferenceVoice::ModelDirLogged).await?;
    Ok(wav_response(wav))
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        timestamp: chrono::Utc::now(),
        system: SystemMetrics::collect(state.started.elapsed().as_secs()),
        synthesis: state.service.metrics().snapshot(),
    })
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
