//! Controller layer: UI events and command orchestration for the plot GUI.

pub mod events;
pub mod orchestration;
