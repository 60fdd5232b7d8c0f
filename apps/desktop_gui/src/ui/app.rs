//! App shell: mode selection, the paged star entry form, upload picking,
//! submission, and the chart panel.

use std::path::PathBuf;

use client_core::{EntryMode, EntrySession, StarFormView, SubmitPolicy};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{PlottedStar, StarRecord},
    protocol::ManualPlotRequest,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::chart::ChartState;

/// Text inputs backing the star form. The entry session reads and writes
/// these through the [`StarFormView`] seam, which keeps paging logic
/// independent of egui.
#[derive(Default)]
struct FormBuffers {
    name: String,
    x: String,
    y: String,
    z: String,
}

impl StarFormView for FormBuffers {
    fn read_fields(&self) -> StarRecord {
        StarRecord {
            name: self.name.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            z: self.z.clone(),
        }
    }

    fn show_star(&mut self, _index: usize, star: &StarRecord) {
        self.name = star.name.clone();
        self.x = star.x.clone();
        self.y = star.y.clone();
        self.z = star.z.clone();
    }
}

/// Line width and star size inputs, kept per mode so switching modes does
/// not clobber what the user typed.
struct SizeInputs {
    line_width: String,
    star_size: String,
}

impl Default for SizeInputs {
    fn default() -> Self {
        Self {
            line_width: "1".to_string(),
            star_size: "5".to_string(),
        }
    }
}

/// The last successful plot, as the server answered it.
struct PlotView {
    stars: Vec<PlottedStar>,
    line_width: f64,
    star_size: f64,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum StatusTone {
    Neutral,
    Success,
    Error,
}

pub struct StarPlotApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    session: EntrySession,
    policy: SubmitPolicy,
    total_input: String,
    form: FormBuffers,
    manual_sizes: SizeInputs,
    auto_sizes: SizeInputs,
    picked_file: Option<PathBuf>,
    status: String,
    status_tone: StatusTone,
    plot: Option<PlotView>,
    chart: ChartState,
}

impl StarPlotApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: String,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            server_url,
            session: EntrySession::new(),
            policy: SubmitPolicy::default(),
            total_input: String::new(),
            form: FormBuffers::default(),
            manual_sizes: SizeInputs::default(),
            auto_sizes: SizeInputs::default(),
            picked_file: None,
            status: "Starting backend worker...".to_string(),
            status_tone: StatusTone::Neutral,
            plot: None,
            chart: ChartState::new(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::WorkerReady => {
                    self.status = format!("Ready - server at {}", self.server_url);
                    self.status_tone = StatusTone::Neutral;
                }
                UiEvent::PlotSucceeded { mode, response } => {
                    self.status = match mode {
                        EntryMode::Automatic => {
                            "Stars detected and plotted successfully!".to_string()
                        }
                        _ => "Stars plotted successfully!".to_string(),
                    };
                    self.status_tone = StatusTone::Success;
                    self.chart.reset();
                    self.plot = Some(PlotView {
                        stars: response.stars,
                        line_width: response.line_width,
                        star_size: response.star_size,
                    });
                }
                UiEvent::PlotFailed(err) => {
                    tracing::warn!(
                        category = ?err.category(),
                        context = ?err.context(),
                        "plot submission failed"
                    );
                    self.status = err.message().to_string();
                    self.status_tone = StatusTone::Error;
                }
            }
        }
    }

    fn show_mode_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Exoplanet Star Plotter").strong().size(16.0));
            ui.separator();
            if ui
                .selectable_label(self.session.mode() == EntryMode::Manual, "Manual Entry")
                .clicked()
            {
                self.session.select_mode(EntryMode::Manual);
            }
            if ui
                .selectable_label(self.session.mode() == EntryMode::Automatic, "Upload Image")
                .clicked()
            {
                self.session.select_mode(EntryMode::Automatic);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(&self.server_url);
            });
        });
    }

    fn show_entry_panel(&mut self, ui: &mut egui::Ui) {
        match self.session.mode() {
            EntryMode::Manual => self.show_manual_form(ui),
            EntryMode::Automatic => self.show_auto_form(ui),
            EntryMode::Unselected => {
                ui.label("Choose Manual Entry or Upload Image to begin.");
            }
        }

        ui.separator();
        let submit_enabled = self.policy.effective_mode(&self.session).is_some();
        if ui
            .add_enabled(submit_enabled, egui::Button::new("Submit"))
            .clicked()
        {
            self.submit();
        }
        if !submit_enabled {
            ui.label("Select a mode before submitting.");
        }
    }

    fn show_manual_form(&mut self, ui: &mut egui::Ui) {
        ui.label("How many stars?");
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.total_input).desired_width(60.0));
            if ui.button("Apply").clicked() {
                match self.total_input.trim().parse::<usize>() {
                    Ok(total) => {
                        self.session.set_total(total, &mut self.form);
                        self.status = if total > 0 {
                            format!("Entering {total} stars")
                        } else {
                            "Star entry cleared".to_string()
                        };
                        self.status_tone = StatusTone::Neutral;
                    }
                    Err(_) => {
                        self.status = "Total stars must be a whole number".to_string();
                        self.status_tone = StatusTone::Error;
                    }
                }
            }
        });

        if self.session.total_stars() == 0 {
            return;
        }

        ui.separator();
        ui.label(egui::RichText::new(format!(
            "Star {} of {}",
            self.session.current_index() + 1,
            self.session.total_stars()
        ))
        .strong());

        egui::Grid::new("star_fields").num_columns(2).show(ui, |ui| {
            ui.label("Name:");
            ui.text_edit_singleline(&mut self.form.name);
            ui.end_row();
            ui.label("X Coordinate:");
            ui.text_edit_singleline(&mut self.form.x);
            ui.end_row();
            ui.label("Y Coordinate:");
            ui.text_edit_singleline(&mut self.form.y);
            ui.end_row();
            ui.label("Z Coordinate:");
            ui.text_edit_singleline(&mut self.form.z);
            ui.end_row();
        });

        ui.horizontal(|ui| {
            if ui.button("Previous").clicked() {
                self.session.prev(&mut self.form);
            }
            if ui.button("Next").clicked() {
                self.session.next(&mut self.form);
            }
        });

        ui.separator();
        size_inputs(ui, "manual_sizes", &mut self.manual_sizes);
    }

    fn show_auto_form(&mut self, ui: &mut egui::Ui) {
        ui.label("Upload a star field image:");
        ui.horizontal(|ui| {
            if ui.button("Choose file").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg"])
                    .pick_file()
                {
                    self.picked_file = Some(path);
                }
            }
            match &self.picked_file {
                Some(path) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    ui.label(name);
                }
                None => {
                    ui.label("No file chosen");
                }
            }
        });

        ui.separator();
        size_inputs(ui, "auto_sizes", &mut self.auto_sizes);
    }

    fn show_chart_panel(&mut self, ui: &mut egui::Ui) {
        match &self.plot {
            Some(plot) => {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new(&self.chart.title).strong().size(18.0));
                });
                self.chart.show(
                    ui,
                    &plot.stars,
                    plot.line_width as f32,
                    plot.star_size as f32,
                );
                ui.add_space(8.0);
                self.chart.title_bar(ui);
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label("Submit stars to draw the chart.");
                });
            }
        }
    }

    fn submit(&mut self) {
        let Some(mode) = self.policy.effective_mode(&self.session) else {
            self.status = "Select a mode before submitting.".to_string();
            self.status_tone = StatusTone::Error;
            return;
        };
        let queued = match mode {
            EntryMode::Manual => {
                // The record on screen is only committed on navigation, so
                // capture it before building the request.
                self.session.save_current(&self.form);
                let request = ManualPlotRequest {
                    stars: self.session.stars().to_vec(),
                    line_width: self.manual_sizes.line_width.clone(),
                    star_size: self.manual_sizes.star_size.clone(),
                };
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::SubmitManual { request },
                    &mut self.status,
                )
            }
            EntryMode::Automatic => dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::SubmitAuto {
                    file_path: self.picked_file.clone(),
                    line_width: self.auto_sizes.line_width.clone(),
                    star_size: self.auto_sizes.star_size.clone(),
                },
                &mut self.status,
            ),
            EntryMode::Unselected => return,
        };
        if queued {
            self.status = "Submitting...".to_string();
            self.status_tone = StatusTone::Neutral;
        } else {
            self.status_tone = StatusTone::Error;
        }
    }
}

fn size_inputs(ui: &mut egui::Ui, id: &str, sizes: &mut SizeInputs) {
    egui::Grid::new(id).num_columns(2).show(ui, |ui| {
        ui.label("Line width:");
        ui.add(egui::TextEdit::singleline(&mut sizes.line_width).desired_width(60.0));
        ui.end_row();
        ui.label("Star size:");
        ui.add(egui::TextEdit::singleline(&mut sizes.star_size).desired_width(60.0));
        ui.end_row();
    });
}

impl eframe::App for StarPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("mode_bar").show(ctx, |ui| self.show_mode_bar(ui));
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let text = egui::RichText::new(&self.status);
            let text = match self.status_tone {
                StatusTone::Success => text.color(egui::Color32::LIGHT_GREEN),
                StatusTone::Error => text.color(egui::Color32::LIGHT_RED),
                StatusTone::Neutral => text,
            };
            ui.label(text);
        });
        egui::SidePanel::left("entry_panel")
            .default_width(320.0)
            .show(ctx, |ui| self.show_entry_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.show_chart_panel(ui));

        // Worker events arrive on a plain channel, so poll again soon even
        // without input.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_buffers_mirror_the_rendered_record() {
        let mut form = FormBuffers::default();
        let star = StarRecord {
            name: "Vega".into(),
            x: "4".into(),
            y: "5".into(),
            z: "6".into(),
        };

        form.show_star(1, &star);
        assert_eq!(form.read_fields(), star);
    }

    #[test]
    fn size_inputs_start_at_the_form_defaults() {
        let sizes = SizeInputs::default();
        assert_eq!(sizes.line_width, "1");
        assert_eq!(sizes.star_size, "5");
    }
}
