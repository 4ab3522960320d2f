use crate::calc::month::add_months;
use crate::calc::{Clock, GridCell, GridModel};
use crate::data::shopping::{next_reminder, MAX_ITEMS};
use crate::data::{KeyValueStore, ShoppingList};
use crate::ui::calendar_widget::{CalendarState, CalendarWidget, GridSurface};
use crate::ui::modal::{overlay_area, DisplayMode, ModalController, EDITOR_MODAL, SHOPPING_MODAL};
use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use crossterm::event::{
    self, Event as CEvent, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use log::{error, info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io::Stdout;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

const CELL_WIDTH: u16 = 3;
const GRID_WIDTH: u16 = CELL_WIDTH * 7;
/// Title and weekday header sit above the first grid row.
const GRID_TOP: u16 = 2;

/// The painted month plus the screen area of each day cell, rebuilt on every
/// draw so presses always resolve against the current grid.
#[derive(Default)]
struct GridBoard {
    grid: GridModel,
    hits: Vec<(Rect, String)>,
}

impl GridSurface for GridBoard {
    fn paint(&mut self, grid: &GridModel) {
        self.grid = grid.clone();
        self.hits.clear();
    }
}

impl GridBoard {
    fn day_at(&self, pos: Position) -> Option<&str> {
        self.hits
            .iter()
            .find(|(r, _)| r.contains(pos))
            .map(|(_, key)| key.as_str())
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum ShoppingField {
    Item,
    Reminder,
}

pub struct App<S: KeyValueStore, C: Clock> {
    calendar: CalendarWidget<S, C>,
    modals: ModalController,
    board: GridBoard,
    shopping: ShoppingList,
    /// Keyboard focus inside the grid; Enter selects it.
    focus: NaiveDate,
    shopping_field: ShoppingField,
    item_input: String,
    reminder_input: String,
    reminder: Option<NaiveDateTime>,
    /// Result of the last action (message, color). Cleared on next keypress.
    status: Option<(String, Color)>,
    /// Frame area from the last draw, used to place overlays for hit tests.
    screen: Rect,
    data_dir: PathBuf,
}

impl<S: KeyValueStore, C: Clock> App<S, C> {
    pub fn new(mut calendar: CalendarWidget<S, C>, data_dir: PathBuf) -> Self {
        let shopping = ShoppingList::load(calendar.store_mut());
        let mut board = GridBoard::default();
        calendar.render(&mut board);
        let focus = calendar.today();
        App {
            calendar,
            modals: ModalController::new(&[EDITOR_MODAL, SHOPPING_MODAL]),
            board,
            shopping,
            focus,
            shopping_field: ShoppingField::Item,
            item_input: String::new(),
            reminder_input: String::new(),
            reminder: None,
            status: None,
            screen: Rect::default(),
            data_dir,
        }
    }

    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status = None;

        if self.modals.handle_key(code) {
            self.calendar.sync_dismissed(&self.modals);
            return false;
        }

        let visible = self.modals.visible().map(|o| o.id);
        match visible {
            Some(EDITOR_MODAL) => self.handle_editor_key(code, modifiers),
            Some(SHOPPING_MODAL) => self.handle_shopping_key(code, modifiers),
            _ => return self.handle_calendar_key(code, modifiers),
        }
        false
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let pos = Position::new(mouse.column, mouse.row);
        if let Some(target) = self.modals.hit(self.screen, pos) {
            self.modals.click(target);
            self.calendar.sync_dismissed(&self.modals);
            return;
        }
        let key = match self.board.day_at(pos) {
            Some(key) => key.to_string(),
            None => return,
        };
        if let Ok(date) = NaiveDate::parse_from_str(&key, "%Y-%m-%d") {
            self.focus = date;
        }
        self.calendar.select_day(&key, &mut self.modals);
    }

    /// Fires a due shopping reminder.
    pub fn tick(&mut self) {
        if let Some(at) = self.reminder {
            if self.calendar.clock().now() >= at {
                let msg = self.shopping.reminder_message();
                info!("event=reminder_fired at={}", at.format("%Y-%m-%d %H:%M"));
                self.status = Some((msg, Color::Magenta));
                self.reminder = None;
            }
        }
    }

    fn handle_calendar_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.move_focus(-1),
            KeyCode::Right => self.move_focus(1),
            KeyCode::Up => self.move_focus(-7),
            KeyCode::Down => self.move_focus(7),
            KeyCode::Enter => {
                let key = self.focus.format("%Y-%m-%d").to_string();
                self.calendar.select_day(&key, &mut self.modals);
            }
            KeyCode::Char('n') | KeyCode::PageDown => {
                self.calendar.next_month(&mut self.board);
                self.focus = add_months(self.focus, 1);
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                self.calendar.prev_month(&mut self.board);
                self.focus = add_months(self.focus, -1);
            }
            KeyCode::Char('t') => {
                self.calendar.current_month(&mut self.board);
                self.focus = self.calendar.today();
            }
            KeyCode::Char('l') => {
                self.shopping_field = ShoppingField::Item;
                self.modals.show(SHOPPING_MODAL, DisplayMode::Flex);
            }
            _ => {}
        }
        false
    }

    /// Moves the focus by `days`, clamped to the displayed month.
    fn move_focus(&mut self, days: i64) {
        let cursor = self.calendar.cursor();
        let (Some(first), Some(last)) = (
            cursor.first_day(),
            NaiveDate::from_ymd_opt(cursor.year, cursor.month, cursor.days()),
        ) else {
            return;
        };
        let Some(date) = self.focus.checked_add_signed(Duration::days(days)) else {
            return;
        };
        self.focus = date.clamp(first, last);
    }

    fn handle_editor_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Enter => {
                let result = self.calendar.save(&mut self.modals, &mut self.board);
                self.report_persist(result, "Note saved");
            }
            KeyCode::Char('d') if ctrl => {
                let result = self.calendar.delete(&mut self.modals, &mut self.board);
                self.report_persist(result, "Note deleted");
            }
            KeyCode::Char('w') if ctrl => {
                self.modals.close_control(EDITOR_MODAL);
                self.calendar.sync_dismissed(&self.modals);
            }
            KeyCode::Backspace => {
                self.calendar.editor_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => {
                self.calendar.editor_mut().push(c);
            }
            _ => {}
        }
    }

    fn handle_shopping_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.shopping_field = match self.shopping_field {
                    ShoppingField::Item => ShoppingField::Reminder,
                    ShoppingField::Reminder => ShoppingField::Item,
                };
            }
            KeyCode::Enter => match self.shopping_field {
                ShoppingField::Item => self.add_item(),
                ShoppingField::Reminder => self.set_reminder(),
            },
            KeyCode::Char('r') if ctrl => {
                self.shopping.reset();
                self.persist_shopping();
            }
            KeyCode::Char('w') if ctrl => self.modals.close_control(SHOPPING_MODAL),
            KeyCode::Backspace => {
                self.input_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => self.input_mut().push(c),
            _ => {}
        }
    }

    fn input_mut(&mut self) -> &mut String {
        match self.shopping_field {
            ShoppingField::Item => &mut self.item_input,
            ShoppingField::Reminder => &mut self.reminder_input,
        }
    }

    fn add_item(&mut self) {
        match self.shopping.add(&self.item_input) {
            Ok(true) => {
                self.item_input.clear();
                self.persist_shopping();
            }
            Ok(false) => {}
            Err(e) => self.status = Some((e.to_string(), Color::Red)),
        }
    }

    fn set_reminder(&mut self) {
        if self.reminder_input.trim().is_empty() {
            self.status = Some(("Please select a reminder time.".to_string(), Color::Yellow));
            return;
        }
        match next_reminder(self.calendar.clock().now(), &self.reminder_input) {
            Ok(at) => {
                info!("event=reminder_set at={}", at.format("%Y-%m-%d %H:%M"));
                self.status = Some((format!("Reminder set for {}", at.format("%H:%M")), Color::Green));
                self.reminder = Some(at);
                self.reminder_input.clear();
            }
            Err(e) => {
                warn!("event=reminder_set status=invalid error={:#}", e);
                self.status = Some(("Please select a reminder time.".to_string(), Color::Yellow));
            }
        }
    }

    fn persist_shopping(&mut self) {
        if let Err(e) = self.shopping.persist(self.calendar.store_mut()) {
            error!("event=shopping_persist status=error error={:#}", e);
            self.status = Some((format!("Could not save shopping list: {e:#}"), Color::Red));
        }
    }

    fn report_persist(&mut self, result: Result<()>, ok_msg: &str) {
        match result {
            Ok(()) => self.status = Some((ok_msg.to_string(), Color::Green)),
            Err(e) => {
                error!("event=notes_persist status=error error={:#}", e);
                self.status = Some((format!("Could not save notes: {e:#}"), Color::Red));
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        self.screen = f.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // clock
                Constraint::Min(10),    // calendar + side panel
                Constraint::Length(4),  // key help
                Constraint::Length(1),  // status
            ])
            .split(self.screen);

        self.render_clock(f, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(GRID_WIDTH + 2), Constraint::Min(20)])
            .split(chunks[1]);
        self.render_calendar(f, body[0]);
        self.render_side_panel(f, body[1]);
        self.render_help(f, chunks[2]);
        self.render_status(f, chunks[3]);

        if let Some(overlay) = self.modals.visible().filter(|o| !o.aria_hidden) {
            let Some(mode) = overlay.display else {
                return;
            };
            let area = overlay_area(mode, self.screen);
            f.render_widget(Clear, area);
            match overlay.id {
                EDITOR_MODAL => self.render_editor(f, area),
                SHOPPING_MODAL => self.render_shopping(f, area),
                _ => {}
            }
        }
    }

    fn render_clock(&self, f: &mut Frame, area: Rect) {
        let now = self.calendar.clock().now();
        let line = Line::from(vec![
            Span::styled(
                now.format("%H:%M").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(now.format("%A, %-d %B %Y").to_string()),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" homedash "));
        f.render_widget(p, area);
    }

    fn render_calendar(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let grid = &self.board.grid;
        let header = self.calendar.week_start().header().join(" ");
        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                format!("{:^21}", grid.title),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )),
            Line::from(header),
        ];

        let focus_key = self.focus.format("%Y-%m-%d").to_string();
        let mut hits = Vec::new();
        for (r, row) in grid.rows.iter().enumerate() {
            let mut spans = Vec::new();
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    GridCell::Blank => spans.push(Span::raw("   ")),
                    GridCell::Day(day) => {
                        let style = calendar_day_style(day.key == focus_key, day.is_today, day.has_note);
                        spans.push(Span::styled(format!("{:2}", day.day), style));
                        spans.push(Span::raw(" "));
                        let rect = Rect::new(
                            inner.x + c as u16 * CELL_WIDTH,
                            inner.y + GRID_TOP + r as u16,
                            CELL_WIDTH - 1,
                            1,
                        );
                        if inner.intersects(rect) {
                            hits.push((rect, day.key.clone()));
                        }
                    }
                }
            }
            lines.push(Line::from(spans));
        }

        f.render_widget(Paragraph::new(lines), inner);
        self.board.hits = hits;
    }

    fn render_side_panel(&self, f: &mut Frame, area: Rect) {
        let focus_key = self.focus.format("%Y-%m-%d").to_string();
        let mut lines: Vec<Line> = vec![Line::from(Span::styled(
            format!("Note for {}:", focus_key),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        match self.calendar.notes().get(&focus_key) {
            Some(text) => lines.push(Line::from(format!("  {}", text))),
            None => lines.push(Line::from("  (no note)")),
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Shopping list:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if self.shopping.items.is_empty() {
            lines.push(Line::from("  (empty)"));
        }
        for item in self.shopping.preview() {
            lines.push(Line::from(format!("  • {}", item)));
        }
        if let Some(at) = self.reminder {
            lines.push(Line::from(format!("  Reminder at {}", at.format("%H:%M"))));
        }
        let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let dim = Style::default().add_modifier(Modifier::DIM);
        let lines = vec![
            Line::from("← → ↑ ↓ move   Enter/click edit note   n / p next/prev month   t today"),
            Line::from("l shopping list   Esc close   q/Ctrl+C quit"),
            Line::from(""),
            Line::from(vec![
                Span::styled("Data  ", dim),
                Span::styled(
                    self.data_dir.to_string_lossy().to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
        ];
        f.render_widget(Paragraph::new(lines), area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        if let Some((msg, color)) = &self.status {
            let line = Line::from(Span::styled(
                msg.clone(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            ));
            f.render_widget(Paragraph::new(line), area);
        }
    }

    fn render_editor(&self, f: &mut Frame, area: Rect) {
        let date = match self.calendar.state() {
            CalendarState::Editing(date) => date,
            CalendarState::Browsing => String::new(),
        };
        let lines = vec![
            Line::from(Span::styled(
                format!("Selected Date: {}", date),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("> {}_", self.calendar.editor())),
            Line::from(""),
            Line::from(Span::styled(
                "Enter save  Ctrl+D delete  Ctrl+W cancel",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];
        let p = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Note "));
        f.render_widget(p, area);
    }

    fn render_shopping(&self, f: &mut Frame, area: Rect) {
        let outer = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Shopping ({}/{}) ", self.shopping.items.len(), MAX_ITEMS));
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let items: Vec<Line> = if self.shopping.items.is_empty() {
            vec![Line::from("(empty)")]
        } else {
            self.shopping
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| Line::from(format!("{:>2}. {}", i + 1, item)))
                .collect()
        };
        f.render_widget(Paragraph::new(items), columns[0]);

        let active = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let field = |label: &str, value: &str, which: ShoppingField| {
            let cursor = if self.shopping_field == which { "_" } else { "" };
            let style = if self.shopping_field == which { active } else { Style::default() };
            Line::from(vec![
                Span::styled(label.to_string(), style),
                Span::raw(format!("{}{}", value, cursor)),
            ])
        };
        let form = vec![
            field("Add item: ", &self.item_input, ShoppingField::Item),
            Line::from(""),
            field("Remind at (HH:MM): ", &self.reminder_input, ShoppingField::Reminder),
            Line::from(""),
            Line::from(Span::styled(
                "Tab switch field  Enter apply",
                Style::default().add_modifier(Modifier::DIM),
            )),
            Line::from(Span::styled(
                "Ctrl+R reset list  Ctrl+W close",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];
        f.render_widget(Paragraph::new(form), columns[1]);
    }
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app<S: KeyValueStore, C: Clock>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<S, C>,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;
        if event::poll(StdDuration::from_millis(250))? {
            match event::read()? {
                CEvent::Key(key) => {
                    if app.handle_key(key.code, key.modifiers) {
                        break;
                    }
                }
                CEvent::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
        app.tick();
    }
    Ok(())
}

/// Determines the ratatui `Style` for a calendar day cell based on its state.
pub(crate) fn calendar_day_style(is_focus: bool, is_today: bool, has_note: bool) -> Style {
    if is_focus {
        let bg = if has_note { Color::Cyan } else { Color::White };
        Style::default()
            .fg(Color::Black)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else if has_note {
        let mut s = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED);
        if is_today {
            s = s.add_modifier(Modifier::REVERSED);
        }
        s
    } else if is_today {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        Style::default()
    }
}
