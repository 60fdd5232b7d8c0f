//! Interactive star chart rendered straight onto an egui painter.
//!
//! White star markers with "name (z: N ly)" annotations on black, light
//! gray constellation lines. Clicking two stars connects them, clicking
//! an existing line removes it again.

use eframe::egui;
use shared::domain::PlottedStar;

pub const DEFAULT_CHART_TITLE: &str = "Exoplanet Star Chart";

/// Distance in data units within which a click counts as hitting a line.
const LINE_HIT_TOLERANCE: f64 = 2.5;
/// Distance in data units within which the pointer counts as hovering a star.
const STAR_HOVER_RADIUS: f64 = 5.0;

const CHART_BACKGROUND: egui::Color32 = egui::Color32::BLACK;
const CHART_FRAME: egui::Color32 = egui::Color32::from_rgb(0x3c, 0x3c, 0x3c);

pub struct ChartState {
    pub title: String,
    title_draft: String,
    lines: Vec<(usize, usize)>,
    selected: Option<usize>,
}

impl ChartState {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_CHART_TITLE.to_string(),
            title_draft: String::new(),
            lines: Vec::new(),
            selected: None,
        }
    }

    /// Forget lines and pending selections. Star indices from an older
    /// plot do not carry over to a new one.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.selected = None;
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        stars: &[PlottedStar],
        line_width: f32,
        star_size: f32,
    ) {
        let side = ui.available_width().min(560.0);
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::click());
        let painter = ui.painter();

        painter.rect_filled(rect, egui::CornerRadius::ZERO, CHART_BACKGROUND);
        painter.rect_stroke(
            rect,
            egui::CornerRadius::ZERO,
            egui::Stroke::new(1.0, CHART_FRAME),
            egui::StrokeKind::Middle,
        );

        let bounds = chart_bounds(stars);

        for &(a, b) in &self.lines {
            let (Some(first), Some(second)) = (stars.get(a), stars.get(b)) else {
                continue;
            };
            painter.line_segment(
                [
                    to_screen(bounds, rect, first.x, first.y),
                    to_screen(bounds, rect, second.x, second.y),
                ],
                egui::Stroke::new(line_width, egui::Color32::LIGHT_GRAY),
            );
        }

        let radius = (star_size / 2.0).max(1.5);
        for star in stars {
            let pos = to_screen(bounds, rect, star.x, star.y);
            painter.circle_filled(pos, radius, egui::Color32::WHITE);
            painter.text(
                pos + egui::vec2(radius + 3.0, -radius - 3.0),
                egui::Align2::LEFT_BOTTOM,
                format!("{} (z: {} ly)", star.name, star.z),
                egui::FontId::proportional(10.0),
                egui::Color32::WHITE,
            );
        }

        if let Some(hover) = response.hover_pos() {
            let (hx, hy) = to_data(bounds, rect, hover);
            if self.hit_anything(stars, hx, hy) {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
        }

        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let (cx, cy) = to_data(bounds, rect, pointer);
                self.handle_click(stars, cx, cy);
            }
        }
    }

    pub fn title_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Rename Your Constellations:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.title_draft)
                    .desired_width(220.0)
                    .hint_text("(insert name) constellation"),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                let next = self.title_draft.trim();
                if !next.is_empty() {
                    self.title = next.to_string();
                }
            }
        });
    }

    fn hit_anything(&self, stars: &[PlottedStar], x: f64, y: f64) -> bool {
        let near_star = stars
            .iter()
            .any(|star| ((star.x - x).powi(2) + (star.y - y).powi(2)).sqrt() < STAR_HOVER_RADIUS);
        if near_star {
            return true;
        }
        self.lines.iter().any(|&(a, b)| {
            let (Some(first), Some(second)) = (stars.get(a), stars.get(b)) else {
                return false;
            };
            point_segment_distance(x, y, first.x, first.y, second.x, second.y) < LINE_HIT_TOLERANCE
        })
    }

    fn handle_click(&mut self, stars: &[PlottedStar], x: f64, y: f64) {
        // A click near an existing line removes that line.
        for (index, &(a, b)) in self.lines.iter().enumerate() {
            let (Some(first), Some(second)) = (stars.get(a), stars.get(b)) else {
                continue;
            };
            if point_segment_distance(x, y, first.x, first.y, second.x, second.y)
                < LINE_HIT_TOLERANCE
            {
                self.lines.remove(index);
                return;
            }
        }

        // Otherwise the closest star becomes (or completes) the selection.
        let Some(closest) = nearest_star(stars, x, y) else {
            return;
        };
        match self.selected.take() {
            None => self.selected = Some(closest),
            Some(first) if first != closest => self.lines.push((first, closest)),
            Some(_) => {}
        }
    }
}

type Bounds = (f64, f64, f64, f64);

fn chart_bounds(stars: &[PlottedStar]) -> Bounds {
    if stars.is_empty() {
        return (0.0, 10.0, 0.0, 10.0);
    }
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for star in stars {
        min_x = min_x.min(star.x);
        max_x = max_x.max(star.x);
        min_y = min_y.min(star.y);
        max_y = max_y.max(star.y);
    }
    let pad_x = ((max_x - min_x) * 0.05).max(1.0);
    let pad_y = ((max_y - min_y) * 0.05).max(1.0);
    (min_x - pad_x, max_x + pad_x, min_y - pad_y, max_y + pad_y)
}

fn to_screen(bounds: Bounds, rect: egui::Rect, x: f64, y: f64) -> egui::Pos2 {
    let (min_x, max_x, min_y, max_y) = bounds;
    let fx = ((x - min_x) / (max_x - min_x)) as f32;
    let fy = ((y - min_y) / (max_y - min_y)) as f32;
    egui::pos2(
        rect.left() + fx * rect.width(),
        rect.bottom() - fy * rect.height(),
    )
}

fn to_data(bounds: Bounds, rect: egui::Rect, pos: egui::Pos2) -> (f64, f64) {
    let (min_x, max_x, min_y, max_y) = bounds;
    let fx = f64::from((pos.x - rect.left()) / rect.width());
    let fy = f64::from((rect.bottom() - pos.y) / rect.height());
    (min_x + fx * (max_x - min_x), min_y + fy * (max_y - min_y))
}

fn nearest_star(stars: &[PlottedStar], x: f64, y: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, star) in stars.iter().enumerate() {
        let distance_sq = (star.x - x).powi(2) + (star.y - y).powi(2);
        if best.map_or(true, |(_, current)| distance_sq < current) {
            best = Some((index, distance_sq));
        }
    }
    best.map(|(index, _)| index)
}

fn point_segment_distance(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((px - x1).powi(2) + (py - y1).powi(2)).sqrt();
    }
    let t = (((px - x1) * dx + (py - y1) * dy) / len_sq).clamp(0.0, 1.0);
    let cx = x1 + t * dx;
    let cy = y1 + t * dy;
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(name: &str, x: f64, y: f64) -> PlottedStar {
        PlottedStar {
            name: name.into(),
            x,
            y,
            z: 120.0,
        }
    }

    #[test]
    fn clicking_two_stars_draws_a_line_between_them() {
        let stars = vec![star("Sirius", 0.0, 0.0), star("Vega", 10.0, 0.0)];
        let mut state = ChartState::new();

        state.handle_click(&stars, 0.2, 0.1);
        assert!(state.lines.is_empty());
        state.handle_click(&stars, 9.8, -0.2);
        assert_eq!(state.lines, vec![(0, 1)]);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn clicking_the_same_star_twice_draws_nothing() {
        let stars = vec![star("Sirius", 0.0, 0.0), star("Vega", 10.0, 0.0)];
        let mut state = ChartState::new();

        state.handle_click(&stars, 0.1, 0.0);
        state.handle_click(&stars, -0.1, 0.1);
        assert!(state.lines.is_empty());
        assert_eq!(state.selected, None);
    }

    #[test]
    fn clicking_near_a_line_removes_it() {
        let stars = vec![star("Sirius", 0.0, 0.0), star("Vega", 10.0, 0.0)];
        let mut state = ChartState::new();
        state.lines.push((0, 1));

        state.handle_click(&stars, 5.0, 1.0);
        assert!(state.lines.is_empty());
    }

    #[test]
    fn clicks_beyond_the_segment_do_not_remove_the_line() {
        let stars = vec![star("Sirius", 0.0, 0.0), star("Vega", 10.0, 0.0)];
        let mut state = ChartState::new();
        state.lines.push((0, 1));

        // On the infinite line but well past the endpoint.
        state.handle_click(&stars, 20.0, 0.0);
        assert_eq!(state.lines, vec![(0, 1)]);
        // The click fell through to star selection instead.
        assert_eq!(state.selected, Some(1));
    }

    #[test]
    fn resetting_clears_lines_and_selection() {
        let stars = vec![star("Sirius", 0.0, 0.0), star("Vega", 10.0, 0.0)];
        let mut state = ChartState::new();
        state.handle_click(&stars, 0.0, 0.0);
        state.lines.push((0, 1));

        state.reset();
        assert!(state.lines.is_empty());
        assert_eq!(state.selected, None);
        assert_eq!(state.title, DEFAULT_CHART_TITLE);
    }

    #[test]
    fn single_star_bounds_still_have_a_usable_span() {
        let (min_x, max_x, min_y, max_y) = chart_bounds(&[star("Solo", 3.0, 4.0)]);
        assert!(min_x < 3.0 && max_x > 3.0);
        assert!(min_y < 4.0 && max_y > 4.0);
    }

    #[test]
    fn screen_mapping_flips_the_y_axis() {
        let rect = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(100.0, 100.0));
        let bounds = (0.0, 10.0, 0.0, 10.0);

        let origin = to_screen(bounds, rect, 0.0, 0.0);
        assert_eq!(origin, egui::pos2(0.0, 100.0));

        let (x, y) = to_data(bounds, rect, egui::pos2(50.0, 100.0));
        assert!((x - 5.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn point_segment_distance_handles_zero_length_segments() {
        let d = point_segment_distance(3.0, 4.0, 0.0, 0.0, 0.0, 0.0);
        assert!((d - 5.0).abs() < 1e-9);
    }
}
