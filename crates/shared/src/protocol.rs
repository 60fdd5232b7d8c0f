use serde::{Deserialize, Serialize};

use crate::domain::{PlottedStar, StarRecord};

/// Multipart field names for `POST /auto`.
pub const FILE_FIELD: &str = "file";
pub const LINE_WIDTH_FIELD: &str = "lineWidth";
pub const STAR_SIZE_FIELD: &str = "starSize";

pub const STATUS_SUCCESS: &str = "success";

pub fn manual_route() -> &'static str {
    "/manual"
}

pub fn auto_route() -> &'static str {
    "/auto"
}

pub fn healthz_route() -> &'static str {
    "/healthz"
}

/// JSON body of `POST /manual`. Keys are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualPlotRequest {
    pub stars: Vec<StarRecord>,
    pub line_width: String,
    pub star_size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub stars: Vec<PlottedStar>,
    pub line_width: f64,
    pub star_size: f64,
}
