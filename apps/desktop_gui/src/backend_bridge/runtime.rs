//! Runtime bridge between the UI command queue and the plot server client.
//!
//! The egui thread must never block on network calls, so a dedicated worker
//! thread owns a tokio runtime and drains the command queue. Results come
//! back to the UI as [`UiEvent`]s over the paired channel.

use std::{path::Path, thread};

use client_core::{EntryMode, SelectedFile, StarPlotClient};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(server_url: String, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::PlotFailed(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = StarPlotClient::new(server_url);
            let _ = ui_tx.try_send(UiEvent::WorkerReady);

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::SubmitManual { request } => {
                        tracing::info!(stars = request.stars.len(), "backend: submit_manual");
                        match client.submit_manual(&request).await {
                            Ok(response) => {
                                let _ = ui_tx.try_send(UiEvent::PlotSucceeded {
                                    mode: EntryMode::Manual,
                                    response,
                                });
                            }
                            Err(err) => {
                                let _ = ui_tx.try_send(UiEvent::PlotFailed(
                                    UiError::from_message(
                                        UiErrorContext::ManualPlot,
                                        err.to_string(),
                                    ),
                                ));
                            }
                        }
                    }
                    BackendCommand::SubmitAuto {
                        file_path,
                        line_width,
                        star_size,
                    } => {
                        tracing::info!(has_file = file_path.is_some(), "backend: submit_auto");
                        let file = match load_selected_file(file_path.as_deref()).await {
                            Ok(file) => file,
                            Err(err) => {
                                let _ = ui_tx.try_send(UiEvent::PlotFailed(
                                    UiError::from_message(UiErrorContext::AutoPlot, err),
                                ));
                                continue;
                            }
                        };
                        match client.submit_auto(file, &line_width, &star_size).await {
                            Ok(response) => {
                                let _ = ui_tx.try_send(UiEvent::PlotSucceeded {
                                    mode: EntryMode::Automatic,
                                    response,
                                });
                            }
                            Err(err) => {
                                let _ = ui_tx.try_send(UiEvent::PlotFailed(
                                    UiError::from_message(
                                        UiErrorContext::AutoPlot,
                                        err.to_string(),
                                    ),
                                ));
                            }
                        }
                    }
                }
            }
        });
    });
}

async fn load_selected_file(path: Option<&Path>) -> Result<Option<SelectedFile>, String> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| format!("could not read '{}': {err}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Some(SelectedFile { file_name, bytes }))
}
