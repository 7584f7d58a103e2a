use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::languages::LanguageRegistry;
use crate::ocr::Tesseract;
use crate::providers::{GoogleTranslate, Provider, ProviderKind};
use crate::settings;
use crate::translator::Translator;

use super::client::{language_options, render_client_html};
use super::models::{
    ErrorResponse, ImageResponse, RenderRequest, SettingsInfo, TranslateRequest,
};
use super::state::ServerState;
use super::translate::{render_request, translate_request, ServerError};

type HandlerResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

pub async fn run_server(settings: settings::Settings, addr: String) -> Result<()> {
    let registry = LanguageRegistry::load()?;
    let provider = match settings.translate.provider {
        ProviderKind::Google => GoogleTranslate::new()
            .with_endpoint(settings.translate.endpoint.as_deref())
            .with_timeout(settings.translate.timeout()),
    };
    let state = Arc::new(ServerState {
        client_html: render_client_html(&settings, &registry)?,
        extractor: Arc::new(Tesseract::new(registry.clone())),
        translator: Translator::new(provider, registry.clone()),
        registry,
        settings,
    });
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind server address {}", addr))?;
    info!(
        "server: listening on http://{} (provider {}, upload limit {} bytes)",
        addr,
        state.settings.translate.provider.as_str(),
        state.settings.max_upload_bytes
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub(crate) fn router<P: Provider + 'static>(state: Arc<ServerState<P>>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.settings.max_upload_bytes);
    Router::new()
        .route("/", get(index::<P>))
        .route("/health", get(health))
        .route("/settings", get(settings_info::<P>))
        .route("/translate", post(translate::<P>))
        .route("/render", post(render::<P>))
        .with_state(state)
        .layer(body_limit)
        .layer(axum::middleware::from_fn(cors_middleware))
}

async fn index<P: Provider + 'static>(State(state): State<Arc<ServerState<P>>>) -> Html<String> {
    Html(state.client_html.clone())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type"),
    );
}

async fn translate<P: Provider + 'static>(
    State(state): State<Arc<ServerState<P>>>,
    Json(payload): Json<TranslateRequest>,
) -> HandlerResult<ImageResponse> {
    let handle = tokio::runtime::Handle::current();
    let result = tokio::task::spawn_blocking(move || {
        handle.block_on(translate_request(state.as_ref(), payload))
    })
    .await
    .map_err(task_failed)?;
    result.map(Json).map_err(into_error_response)
}

async fn render<P: Provider + 'static>(
    State(state): State<Arc<ServerState<P>>>,
    Json(payload): Json<RenderRequest>,
) -> HandlerResult<ImageResponse> {
    let result = tokio::task::spawn_blocking(move || render_request(&state.settings, payload))
        .await
        .map_err(task_failed)?;
    result.map(Json).map_err(into_error_response)
}

async fn settings_info<P: Provider + 'static>(
    State(state): State<Arc<ServerState<P>>>,
) -> Json<SettingsInfo> {
    let settings = &state.settings;
    Json(SettingsInfo {
        ocr_languages: settings.ocr_languages.clone(),
        lang: settings.translate.lang.clone(),
        source_lang: settings.translate.source_lang.clone(),
        policy: settings.render.policy,
        wrap_width: settings.render.wrap_width,
        languages: language_options(&state.registry),
    })
}

fn task_failed(err: tokio::task::JoinError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("server task failed: {}", err),
        }),
    )
}

fn into_error_response(err: ServerError) -> (StatusCode, Json<ErrorResponse>) {
    (err.status, Json(ErrorResponse { error: err.message }))
}
