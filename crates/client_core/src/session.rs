use shared::domain::StarRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Manual,
    Automatic,
    Unselected,
}

/// Rendering adapter between the session and whatever widgets host the star
/// fields: GUI text buffers in the app, a fake in tests.
pub trait StarFormView {
    /// Current contents of the name/x/y/z inputs.
    fn read_fields(&self) -> StarRecord;
    /// Display record `index`, replacing the inputs' contents.
    fn show_star(&mut self, index: usize, star: &StarRecord);
}

/// In-memory entry state for one application run: the selected mode, the
/// ordered star list and the pagination cursor. Nothing here persists.
///
/// Invariant: `current_index < total_stars` whenever `total_stars > 0`, and
/// `stars.len() == total_stars` once a count has been applied. The cursor is
/// meaningless while `total_stars == 0`.
#[derive(Debug, Clone)]
pub struct EntrySession {
    mode: EntryMode,
    stars: Vec<StarRecord>,
    current_index: usize,
    total_stars: usize,
}

impl Default for EntrySession {
    fn default() -> Self {
        Self::new()
    }
}

impl EntrySession {
    pub fn new() -> Self {
        Self {
            mode: EntryMode::Unselected,
            stars: Vec::new(),
            current_index: 0,
            total_stars: 0,
        }
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    /// Pick the entry mode. Selecting again overwrites; the dispatcher never
    /// re-derives the mode from which widgets happen to be visible.
    pub fn select_mode(&mut self, mode: EntryMode) {
        self.mode = mode;
    }

    pub fn total_stars(&self) -> usize {
        self.total_stars
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn stars(&self) -> &[StarRecord] {
        &self.stars
    }

    pub fn star_at(&self, index: usize) -> Option<&StarRecord> {
        self.stars.get(index)
    }

    /// Rebuild the list as `total` blank records, discarding prior edits, and
    /// jump back to the first one. With `total == 0` nothing is rendered and
    /// the view keeps whatever it last displayed.
    pub fn set_total(&mut self, total: usize, view: &mut dyn StarFormView) {
        self.stars = vec![StarRecord::default(); total];
        self.total_stars = total;
        self.current_index = 0;
        if total > 0 {
            self.render(0, view);
        }
    }

    /// Display record `index` with its latest saved values.
    pub fn render(&self, index: usize, view: &mut dyn StarFormView) {
        if let Some(star) = self.stars.get(index) {
            view.show_star(index, star);
        }
    }

    /// Overwrite `stars[index]` with the view's current field values, a full
    /// replacement rather than a merge.
    pub fn save(&mut self, index: usize, view: &dyn StarFormView) {
        if index < self.stars.len() {
            self.stars[index] = view.read_fields();
        }
    }

    /// Capture the displayed record without navigating. Submission calls this
    /// so the last edit lands even when the user never pressed next/prev.
    pub fn save_current(&mut self, view: &dyn StarFormView) {
        if self.total_stars > 0 {
            self.save(self.current_index, view);
        }
    }

    /// Save the displayed record, then step back one. No-op at the first.
    pub fn prev(&mut self, view: &mut dyn StarFormView) {
        if self.current_index > 0 {
            self.save(self.current_index, view);
            self.current_index -= 1;
            self.render(self.current_index, view);
        }
    }

    /// Save the displayed record, then step forward one. No-op at the last.
    pub fn next(&mut self, view: &mut dyn StarFormView) {
        if self.total_stars > 0 && self.current_index < self.total_stars - 1 {
            self.save(self.current_index, view);
            self.current_index += 1;
            self.render(self.current_index, view);
        }
    }
}

/// What submit does when no mode was ever selected: fall through to the
/// configured mode, or refuse when the fallback is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPolicy {
    pub unselected_fallback: Option<EntryMode>,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            unselected_fallback: Some(EntryMode::Automatic),
        }
    }
}

impl SubmitPolicy {
    /// Mode a submission should take right now, `None` when no mode was
    /// selected and no usable fallback is configured.
    pub fn effective_mode(&self, session: &EntrySession) -> Option<EntryMode> {
        match session.mode() {
            EntryMode::Unselected => match self.unselected_fallback {
                Some(EntryMode::Unselected) | None => None,
                fallback => fallback,
            },
            mode => Some(mode),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
