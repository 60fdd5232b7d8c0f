//! egui user interface for the star plotter.

pub mod app;
pub mod chart;

pub use app::StarPlotApp;
