use std::path::PathBuf;

use anyhow::Context;
use shared::{
    domain::PlottedStar,
    error::{ApiError, ErrorCode},
    protocol::{ManualPlotRequest, PlotResponse, STATUS_SUCCESS},
};
use tracing::info;
use uuid::Uuid;

use crate::detect::{detect_stars, DetectionSettings};

const MAX_FILENAME_BYTES: usize = 180;

#[derive(Clone)]
pub struct ApiContext {
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub detection: DetectionSettings,
}

/// One file pulled out of a multipart upload.
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Turn manually entered star records into a plottable chart payload.
///
/// Coordinates arrive as raw form strings and are parsed here so a typo
/// in one field reports which star and axis is at fault.
pub fn plot_manual(request: &ManualPlotRequest) -> Result<PlotResponse, ApiError> {
    let line_width = parse_size("lineWidth", &request.line_width)?;
    let star_size = parse_size("starSize", &request.star_size)?;

    let mut stars = Vec::with_capacity(request.stars.len());
    for (index, record) in request.stars.iter().enumerate() {
        stars.push(PlottedStar {
            name: record.name.clone(),
            x: parse_coordinate("x", &record.x, index)?,
            y: parse_coordinate("y", &record.y, index)?,
            z: parse_coordinate("z", &record.z, index)?,
        });
    }

    Ok(PlotResponse {
        status: STATUS_SUCCESS.into(),
        message: None,
        stars,
        line_width,
        star_size,
    })
}

/// Store an uploaded frame, run star detection on it, and answer with the
/// detected stars. Depth is not recoverable from a single image, so each
/// star gets a random distance between 100 and 250 light years.
pub async fn plot_auto(
    ctx: &ApiContext,
    file: Option<UploadedFile>,
    line_width: Option<&str>,
    star_size: Option<&str>,
) -> Result<PlotResponse, ApiError> {
    let Some(file) = file else {
        return Err(ApiError::new(ErrorCode::Validation, "No file part"));
    };
    if file.file_name.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "No selected file"));
    }

    let line_width = required_size("lineWidth", line_width)?;
    let star_size = required_size("starSize", star_size)?;

    if file.bytes.len() > ctx.max_upload_bytes {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("file exceeds the {} byte upload limit", ctx.max_upload_bytes),
        ));
    }

    let stored = store_upload(ctx, &file).await.map_err(internal)?;

    let decoded = image::load_from_memory(&file.bytes)
        .map_err(|e| ApiError::new(ErrorCode::Validation, format!("could not decode image: {e}")))?;
    let gray = decoded.to_luma8();

    let blobs = detect_stars(&gray, &ctx.detection);
    info!(
        path = %stored.display(),
        stars = blobs.len(),
        "detected stars in upload"
    );

    let stars = blobs
        .iter()
        .enumerate()
        .map(|(i, blob)| PlottedStar {
            name: format!("Star{}", i + 1),
            x: blob.x,
            y: blob.y,
            z: f64::from(100 + rand::random::<u32>() % 150),
        })
        .collect::<Vec<_>>();

    Ok(PlotResponse {
        status: STATUS_SUCCESS.into(),
        message: Some(format!("detected {} stars", stars.len())),
        stars,
        line_width,
        star_size,
    })
}

fn parse_size(field: &str, raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ApiError::new(ErrorCode::Validation, format!("{field} is not a number")))
}

fn required_size(field: &str, raw: Option<&str>) -> Result<f64, ApiError> {
    let raw = raw
        .ok_or_else(|| ApiError::new(ErrorCode::Validation, format!("missing field '{field}'")))?;
    parse_size(field, raw)
}

fn parse_coordinate(axis: &str, raw: &str, index: usize) -> Result<f64, ApiError> {
    raw.trim().parse::<f64>().map_err(|_| {
        ApiError::new(
            ErrorCode::Validation,
            format!("{axis} is not a number for star {}", index + 1),
        )
    })
}

async fn store_upload(ctx: &ApiContext, file: &UploadedFile) -> anyhow::Result<PathBuf> {
    let name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(&file.file_name));
    let path = ctx.upload_dir.join(name);
    tokio::fs::write(&path, &file.bytes)
        .await
        .with_context(|| format!("failed to store upload at '{}'", path.display()))?;
    Ok(path)
}

/// Strip path components and oddball characters from a client supplied name.
fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        return "upload".into();
    }
    // All characters are ASCII at this point, so byte truncation is safe.
    cleaned.truncate(MAX_FILENAME_BYTES);
    cleaned
}

fn internal(err: anyhow::Error) -> ApiError {
    tracing::error!(%err, "internal error while handling a plot request");
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
