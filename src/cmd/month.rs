use crate::calc::{build_grid, Clock, GridCell, GridModel, MonthCursor, SystemClock, WeekStart};
use crate::data::persistence::get_data_dir;
use crate::data::{AppSettings, FileStore, NoteMap};
use anyhow::Result;
use chrono::NaiveDate;

pub fn run(settings: &AppSettings, month: Option<MonthCursor>, today: Option<NaiveDate>) -> Result<()> {
    let today = today.unwrap_or_else(|| SystemClock.today());
    let cursor = month.unwrap_or_else(|| MonthCursor::from_date(today));
    let store = FileStore::open(&get_data_dir()?);
    let notes = NoteMap::load(&store);
    let grid = build_grid(cursor, &notes, today, settings.week_start);
    write_month(&grid, settings.week_start, &mut std::io::stdout())
}

/// Plain-text grid: `[..]` marks today, `*` follows days with a note.
pub(crate) fn write_month<W: std::io::Write>(
    grid: &GridModel,
    week_start: WeekStart,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{:^35}", grid.title)?;
    let header: String = week_start.header().iter().map(|d| format!(" {}  ", d)).collect();
    writeln!(out, "{}", header.trim_end())?;
    for row in &grid.rows {
        let mut line = String::new();
        for cell in row {
            match cell {
                GridCell::Blank => line.push_str("     "),
                GridCell::Day(day) => {
                    let (open, close) = if day.is_today { ('[', ']') } else { (' ', ' ') };
                    let mark = if day.has_note { '*' } else { ' ' };
                    line.push_str(&format!("{}{:2}{}{}", open, day.day, close, mark));
                }
            }
        }
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}
