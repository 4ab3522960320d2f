use crate::calc::month::{date_key, MonthCursor, WeekStart};
use crate::data::NoteMap;
use chrono::{Datelike, NaiveDate};

pub const WEEK_LEN: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    /// `YYYY-MM-DD`, used to address the cell when it is selected.
    pub key: String,
    pub is_today: bool,
    pub has_note: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridCell {
    Blank,
    Day(DayCell),
}

/// One rendered month: rows of at most seven cells. Leading blanks pad the
/// first row; the last row is left short.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GridModel {
    pub title: String,
    pub rows: Vec<Vec<GridCell>>,
}

#[cfg(test)]
impl GridModel {
    pub fn day_cells(&self) -> impl Iterator<Item = &DayCell> {
        self.rows.iter().flatten().filter_map(|c| match c {
            GridCell::Day(d) => Some(d),
            GridCell::Blank => None,
        })
    }

    pub fn leading_blanks(&self) -> usize {
        self.rows
            .first()
            .map(|r| r.iter().take_while(|c| **c == GridCell::Blank).count())
            .unwrap_or(0)
    }

    pub fn cell(&self, key: &str) -> Option<&DayCell> {
        self.day_cells().find(|c| c.key == key)
    }
}

/// Builds the grid for `cursor` from the note mapping. Pure: the same inputs
/// always produce the same model.
pub fn build_grid(
    cursor: MonthCursor,
    notes: &NoteMap,
    today: NaiveDate,
    week_start: WeekStart,
) -> GridModel {
    let first = match cursor.first_day() {
        Some(d) => d,
        None => return GridModel::default(),
    };
    let offset = week_start.offset(first.weekday()) as usize;
    let show_today = cursor.contains(today);

    let mut cells: Vec<GridCell> = vec![GridCell::Blank; offset];
    for day in 1..=cursor.days() {
        let key = date_key(cursor.year, cursor.month, day);
        cells.push(GridCell::Day(DayCell {
            day,
            is_today: show_today && today.day() == day,
            has_note: notes.contains(&key),
            key,
        }));
    }

    GridModel {
        title: cursor.title(),
        rows: cells.chunks(WEEK_LEN).map(|c| c.to_vec()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_leap_february_has_29_days_and_weekday_offset() {
        let notes = NoteMap::default();
        let grid = build_grid(MonthCursor::new(2024, 2), &notes, d(2024, 5, 1), WeekStart::Sunday);
        assert_eq!(grid.day_cells().count(), 29);
        // 2024-02-01 is a Thursday.
        assert_eq!(grid.leading_blanks(), 4);
        assert!(grid.day_cells().all(|c| !c.has_note));
        assert!(grid.day_cells().all(|c| !c.is_today));
    }

    #[test]
    fn test_rows_wrap_at_seven() {
        let notes = NoteMap::default();
        let grid = build_grid(MonthCursor::new(2024, 2), &notes, d(2024, 5, 1), WeekStart::Sunday);
        // 4 blanks + 29 days = 33 cells
        assert_eq!(grid.rows.len(), 5);
        assert!(grid.rows[..4].iter().all(|r| r.len() == 7));
        assert_eq!(grid.rows[4].len(), 5);
    }

    #[test]
    fn test_month_filling_exact_rows_has_no_trailing_row() {
        // February 2015 starts on a Sunday and has 28 days.
        let notes = NoteMap::default();
        let grid = build_grid(MonthCursor::new(2015, 2), &notes, d(2015, 2, 1), WeekStart::Sunday);
        assert_eq!(grid.leading_blanks(), 0);
        assert_eq!(grid.rows.len(), 4);
    }

    #[test]
    fn test_monday_start_shifts_offset() {
        let notes = NoteMap::default();
        // 2024-09-01 is a Sunday.
        let grid = build_grid(MonthCursor::new(2024, 9), &notes, d(2024, 9, 1), WeekStart::Monday);
        assert_eq!(grid.leading_blanks(), 6);
    }

    #[test]
    fn test_only_noted_day_carries_marker() {
        let mut notes = NoteMap::default();
        notes.set("2024-03-05", "Dentist");
        let grid = build_grid(MonthCursor::new(2024, 3), &notes, d(2024, 1, 1), WeekStart::Sunday);
        let marked: Vec<u32> = grid.day_cells().filter(|c| c.has_note).map(|c| c.day).collect();
        assert_eq!(marked, vec![5]);
    }

    #[test]
    fn test_today_marked_only_in_current_month() {
        let notes = NoteMap::default();
        let today = d(2024, 3, 17);
        let grid = build_grid(MonthCursor::new(2024, 3), &notes, today, WeekStart::Sunday);
        let todays: Vec<&str> = grid.day_cells().filter(|c| c.is_today).map(|c| c.key.as_str()).collect();
        assert_eq!(todays, vec!["2024-03-17"]);

        let other = build_grid(MonthCursor::new(2024, 4), &notes, today, WeekStart::Sunday);
        assert!(other.day_cells().all(|c| !c.is_today));
        let last_year = build_grid(MonthCursor::new(2023, 3), &notes, today, WeekStart::Sunday);
        assert!(last_year.day_cells().all(|c| !c.is_today));
    }

    #[test]
    fn test_cells_carry_date_keys() {
        let notes = NoteMap::default();
        let grid = build_grid(MonthCursor::new(2024, 3), &notes, d(2024, 1, 1), WeekStart::Sunday);
        assert_eq!(grid.cell("2024-03-05").map(|c| c.day), Some(5));
        assert!(grid.cell("2024-04-01").is_none());
        assert_eq!(grid.title, "March 2024");
    }

    #[test]
    fn test_rendering_twice_is_identical() {
        let mut notes = NoteMap::default();
        notes.set("2024-03-05", "Dentist");
        let c = MonthCursor::new(2024, 3);
        let a = build_grid(c, &notes, d(2024, 3, 9), WeekStart::Sunday);
        let b = build_grid(c, &notes, d(2024, 3, 9), WeekStart::Sunday);
        assert_eq!(a, b);
    }
}
