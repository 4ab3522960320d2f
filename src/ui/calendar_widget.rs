use crate::calc::{build_grid, Clock, GridModel, MonthCursor, WeekStart};
use crate::data::{KeyValueStore, NoteMap};
use crate::ui::modal::{DisplayMode, ModalController, EDITOR_MODAL};
use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, info};

/// Something that can draw a rendered month.
pub trait GridSurface {
    fn paint(&mut self, grid: &GridModel);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalendarState {
    Browsing,
    Editing(String),
}

/// Month grid plus date-keyed notes. Every mutation is persisted before the
/// grid is rebuilt.
pub struct CalendarWidget<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
    week_start: WeekStart,
    notes: NoteMap,
    cursor: MonthCursor,
    selection: Option<String>,
    editor: String,
}

impl<S: KeyValueStore, C: Clock> CalendarWidget<S, C> {
    pub fn new(store: S, clock: C, week_start: WeekStart) -> Self {
        let notes = NoteMap::load(&store);
        let cursor = MonthCursor::from_date(clock.today());
        info!(
            "event=calendar_init notes={} cursor={}-{:02}",
            notes.len(),
            cursor.year,
            cursor.month
        );
        CalendarWidget {
            store,
            clock,
            week_start,
            notes,
            cursor,
            selection: None,
            editor: String::new(),
        }
    }

    pub fn state(&self) -> CalendarState {
        match &self.selection {
            Some(date) => CalendarState::Editing(date.clone()),
            None => CalendarState::Browsing,
        }
    }

    /// Rebuilds the grid from the cursor and notes, then hands it to `surface`.
    pub fn render(&mut self, surface: &mut dyn GridSurface) {
        let grid = build_grid(self.cursor, &self.notes, self.clock.today(), self.week_start);
        surface.paint(&grid);
    }

    /// Opens the editor for `date`, pre-filled with its note if any.
    pub fn select_day(&mut self, date: &str, modals: &mut ModalController) {
        self.editor = self.notes.get(date).unwrap_or_default().to_string();
        self.selection = Some(date.to_string());
        modals.show(EDITOR_MODAL, DisplayMode::Block);
        debug!("event=day_selected date={}", date);
    }

    /// Stores the trimmed editor text for the selected day; empty text
    /// removes the note. No-op without a selection.
    pub fn save(&mut self, modals: &mut ModalController, surface: &mut dyn GridSurface) -> Result<()> {
        let Some(date) = self.selection.take() else {
            return Ok(());
        };
        let stored = self.notes.set(&date, &self.editor);
        info!("event=note_save date={} stored={}", date, stored);
        self.finish_edit(modals, surface)
    }

    /// Removes the selected day's note. No-op without a selection.
    pub fn delete(&mut self, modals: &mut ModalController, surface: &mut dyn GridSurface) -> Result<()> {
        let Some(date) = self.selection.take() else {
            return Ok(());
        };
        self.notes.remove(&date);
        info!("event=note_delete date={}", date);
        self.finish_edit(modals, surface)
    }

    fn finish_edit(&mut self, modals: &mut ModalController, surface: &mut dyn GridSurface) -> Result<()> {
        let persisted = self.notes.persist(&mut self.store);
        modals.hide(EDITOR_MODAL);
        self.editor.clear();
        self.render(surface);
        persisted
    }

    /// Drops the selection once the editor has been dismissed by other means
    /// (cancel control, background press, Escape).
    pub fn sync_dismissed(&mut self, modals: &ModalController) {
        if self.selection.is_some() && !modals.is_visible(EDITOR_MODAL) {
            debug!("event=edit_cancelled");
            self.selection = None;
            self.editor.clear();
        }
    }

    pub fn next_month(&mut self, surface: &mut dyn GridSurface) {
        self.cursor = self.cursor.next();
        self.render(surface);
    }

    pub fn prev_month(&mut self, surface: &mut dyn GridSurface) {
        self.cursor = self.cursor.prev();
        self.render(surface);
    }

    /// Moves the cursor back to the real current month.
    pub fn current_month(&mut self, surface: &mut dyn GridSurface) {
        self.cursor = MonthCursor::from_date(self.clock.today());
        self.render(surface);
    }

    pub fn editor(&self) -> &str {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut String {
        &mut self.editor
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn notes(&self) -> &NoteMap {
        &self.notes
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
