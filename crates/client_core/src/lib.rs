use reqwest::{multipart, Client, StatusCode};
use shared::{
    error::ApiError,
    protocol::{self, ManualPlotRequest, PlotResponse},
};
use thiserror::Error;
use tracing::{debug, warn};

pub mod session;

pub use session::{EntryMode, EntrySession, StarFormView, SubmitPolicy};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: connect, send, or body decode.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with its structured error envelope.
    #[error("server rejected request: {0}")]
    Api(ApiError),
    /// Non-success status without a decodable error envelope.
    #[error("server returned status {0}")]
    Status(StatusCode),
}

/// File staged for automatic submission: the name shown to the user and the
/// bytes read from disk.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct StarPlotClient {
    http: Client,
    server_url: String,
}

impl StarPlotClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Post the hand-entered star list as JSON to the manual endpoint.
    /// Coordinates and the two size fields travel as the raw strings the user
    /// typed; the server does the parsing.
    pub async fn submit_manual(
        &self,
        request: &ManualPlotRequest,
    ) -> Result<PlotResponse, ClientError> {
        debug!(stars = request.stars.len(), "submitting manual plot");
        let response = self
            .http
            .post(format!("{}{}", self.server_url, protocol::manual_route()))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Post the selected file plus the two size fields as multipart form data
    /// to the automatic endpoint. When no file was picked the `file` part is
    /// simply absent and the server answers with its rejection.
    pub async fn submit_auto(
        &self,
        file: Option<SelectedFile>,
        line_width: &str,
        star_size: &str,
    ) -> Result<PlotResponse, ClientError> {
        let mut form = multipart::Form::new()
            .text(protocol::LINE_WIDTH_FIELD, line_width.to_string())
            .text(protocol::STAR_SIZE_FIELD, star_size.to_string());
        if let Some(file) = file {
            debug!(file_name = %file.file_name, bytes = file.bytes.len(), "submitting file for detection");
            let mime = mime_guess::from_path(&file.file_name).first_or_octet_stream();
            let part = multipart::Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(mime.essence_str())?;
            form = form.part(protocol::FILE_FIELD, part);
        }

        let response = self
            .http
            .post(format!("{}{}", self.server_url, protocol::auto_route()))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<PlotResponse, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        match response.json::<ApiError>().await {
            Ok(api_error) => Err(ClientError::Api(api_error)),
            Err(_) => {
                warn!(%status, "server error response had no decodable body");
                Err(ClientError::Status(status))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
