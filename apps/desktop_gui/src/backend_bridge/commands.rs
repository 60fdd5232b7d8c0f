//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use shared::protocol::ManualPlotRequest;

pub enum BackendCommand {
    SubmitManual {
        request: ManualPlotRequest,
    },
    SubmitAuto {
        file_path: Option<PathBuf>,
        line_width: String,
        star_size: String,
    },
}
