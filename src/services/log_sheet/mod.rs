//! Driver's daily log sheet rendering
//!
//! `LogSheetLayout::build` turns a `DayLog` into everything printed on the
//! sheet; `raster` draws that layout and encodes it as a PNG.

mod font;
mod layout;
mod raster;

pub use layout::LogSheetLayout;

use crate::error::Result;
use crate::types::DayLog;

/// Render one day's sheet as PNG bytes
pub fn render_log_sheet(day: &DayLog, driver_name: &str, cycle_limit_hours: f64) -> Result<Vec<u8>> {
    let layout = LogSheetLayout::build(day, driver_name, cycle_limit_hours);
    let png = raster::draw(&layout).into_png()?;

    tracing::debug!(
        "Rendered log sheet for {} ({} intervals, {} bytes)",
        layout.header.date,
        day.intervals.len(),
        png.len()
    );

    Ok(png)
}
