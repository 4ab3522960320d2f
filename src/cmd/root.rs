use crate::calc::{Clock, FixedClock, SystemClock};
use crate::data::{persistence::get_data_dir, AppSettings, FileStore};
use crate::ui::calendar_view::{run_app, App};
use crate::ui::calendar_widget::CalendarWidget;
use crate::ui::{restore_terminal, setup_terminal};
use anyhow::Result;
use chrono::NaiveDate;
use log::info;

pub fn run(settings: &AppSettings, today: Option<NaiveDate>) -> Result<()> {
    match today {
        Some(date) => run_with(settings, FixedClock { date }),
        None => run_with(settings, SystemClock),
    }
}

fn run_with<C: Clock>(settings: &AppSettings, clock: C) -> Result<()> {
    let data_dir = get_data_dir()?;
    let store = FileStore::open(&data_dir);
    let calendar = CalendarWidget::new(store, clock, settings.week_start);
    let mut app = App::new(calendar, data_dir);

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        );
        original_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    info!("event=app_exit ok={}", result.is_ok());

    result
}
