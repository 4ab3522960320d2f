pub mod grid;
pub mod month;

pub use grid::{build_grid, GridCell, GridModel};
pub use month::{Clock, FixedClock, MonthCursor, SystemClock, WeekStart};
