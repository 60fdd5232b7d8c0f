//! UI/backend events and error modeling for the plot controller.

use client_core::EntryMode;
use shared::protocol::PlotResponse;

pub enum UiEvent {
    WorkerReady,
    PlotSucceeded {
        mode: EntryMode,
        response: PlotResponse,
    },
    PlotFailed(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    ManualPlot,
    AutoPlot,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("is not a number")
            || message_lower.contains("no file")
            || message_lower.contains("no selected file")
            || message_lower.contains("missing")
            || message_lower.contains("invalid")
            || message_lower.contains("malformed")
            || message_lower.contains("decode")
            || message_lower.contains("validation")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("connection")
            || message_lower.contains("timed out")
            || message_lower.contains("timeout")
            || message_lower.contains("dns")
            || message_lower.contains("network")
            || message_lower.contains("unreachable")
            || message_lower.contains("error sending request")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
