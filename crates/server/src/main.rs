use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{self, ManualPlotRequest, PlotResponse},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

mod api;
mod config;
mod detect;

use api::{ApiContext, UploadedFile};
use config::{load_settings, prepare_upload_dir};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let upload_dir = prepare_upload_dir(&settings.upload_dir).map_err(|err| {
        error!(
            %err,
            "failed to prepare upload directory; verify permissions on the configured path"
        );
        err
    })?;
    let api = ApiContext {
        upload_dir,
        max_upload_bytes: settings.max_upload_bytes,
        detection: settings.detection,
    };

    let state = AppState { api };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.api.max_upload_bytes;
    Router::new()
        .route(protocol::healthz_route(), get(healthz))
        .route(protocol::manual_route(), post(http_manual_plot))
        .route(protocol::auto_route(), post(http_auto_plot))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_manual_plot(
    Json(req): Json<ManualPlotRequest>,
) -> Result<Json<PlotResponse>, (StatusCode, Json<ApiError>)> {
    let response = api::plot_manual(&req).map_err(error_response)?;
    Ok(Json(response))
}

async fn http_auto_plot(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PlotResponse>, (StatusCode, Json<ApiError>)> {
    let mut file: Option<UploadedFile> = None;
    let mut line_width: Option<String> = None;
    let mut star_size: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(ApiError::new(
            ErrorCode::Validation,
            format!("malformed multipart body: {e}"),
        ))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == protocol::FILE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|e| {
                error_response(ApiError::new(
                    ErrorCode::Validation,
                    format!("could not read upload: {e}"),
                ))
            })?;
            file = Some(UploadedFile {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else if name == protocol::LINE_WIDTH_FIELD {
            line_width = Some(read_text_field(field).await?);
        } else if name == protocol::STAR_SIZE_FIELD {
            star_size = Some(read_text_field(field).await?);
        }
    }

    let response = api::plot_auto(&state.api, file, line_width.as_deref(), star_size.as_deref())
        .await
        .map_err(error_response)?;
    Ok(Json(response))
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<String, (StatusCode, Json<ApiError>)> {
    field.text().await.map_err(|e| {
        error_response(ApiError::new(
            ErrorCode::Validation,
            format!("could not read form field: {e}"),
        ))
    })
}

fn error_response(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}
