//! Draws a `LogSheetLayout` onto an RGBA canvas and encodes it as PNG

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use super::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::layout::{format_hours, LogSheetLayout, PAGE_HEIGHT, PAGE_WIDTH};
use crate::types::DutyStatus;

// =============================================================================
// Palette and geometry
// =============================================================================

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRID_GREY: Rgba<u8> = Rgba([160, 160, 160, 255]);

const GRID_LEFT: u32 = 200;
const HOUR_WIDTH: u32 = 36;
const GRID_RIGHT: u32 = GRID_LEFT + 24 * HOUR_WIDTH;
const GRID_TOP: u32 = 210;
const LANE_HEIGHT: u32 = 40;
const GRID_BOTTOM: u32 = GRID_TOP + 4 * LANE_HEIGHT;
const BAR_THICKNESS: u32 = 10;

const MARGIN: u32 = 40;
const REMARKS_TOP: u32 = 400;
const REMARK_SPACING: u32 = 18;
/// Keeps remark text clear of the totals column
const REMARK_MAX_CHARS: usize = 48;
const SIDE_COLUMN: u32 = 660;

fn status_color(status: DutyStatus) -> Rgba<u8> {
    match status {
        DutyStatus::OffDuty => Rgba([0x00, 0xFF, 0x00, 255]),
        DutyStatus::SleeperBerth => Rgba([0xFF, 0xFF, 0x00, 255]),
        DutyStatus::Driving => Rgba([0x00, 0x00, 0xFF, 255]),
        DutyStatus::OnDutyNotDriving => Rgba([0xFF, 0x00, 0x00, 255]),
    }
}

fn lane_center(status: DutyStatus) -> u32 {
    GRID_TOP + u32::from(status.line() - 1) * LANE_HEIGHT + LANE_HEIGHT / 2
}

fn hour_x(hour: f64) -> u32 {
    let clamped = hour.clamp(0.0, 24.0);
    GRID_LEFT + (clamped * f64::from(HOUR_WIDTH)).round() as u32
}

// =============================================================================
// Canvas
// =============================================================================

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, WHITE),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Filled rectangle, clipped to the canvas
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        let x_end = x.saturating_add(w).min(self.width());
        let y_end = y.saturating_add(h).min(self.height());
        for py in y..y_end {
            for px in x..x_end {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    pub fn hline(&mut self, x0: u32, x1: u32, y: u32, thickness: u32, color: Rgba<u8>) {
        let (left, right) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        self.fill_rect(left, y.saturating_sub(thickness / 2), right - left + 1, thickness, color);
    }

    pub fn vline(&mut self, x: u32, y0: u32, y1: u32, thickness: u32, color: Rgba<u8>) {
        let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        self.fill_rect(x.saturating_sub(thickness / 2), top, thickness, bottom - top + 1, color);
    }

    pub fn text(&mut self, x: u32, y: u32, text: &str, scale: u32, color: Rgba<u8>) {
        let mut origin = x;
        for c in text.chars() {
            let rows = font::glyph(c);
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                        self.fill_rect(
                            origin + col * scale,
                            y + row as u32 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
            origin += font::ADVANCE * scale;
        }
    }

    pub fn text_centered(&mut self, center_x: u32, y: u32, text: &str, scale: u32, color: Rgba<u8>) {
        let half = font::text_width(text, scale) / 2;
        self.text(center_x.saturating_sub(half), y, text, scale, color);
    }

    pub fn into_png(self) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

// =============================================================================
// Sheet
// =============================================================================

pub fn draw(layout: &LogSheetLayout) -> Canvas {
    let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);

    draw_header(&mut canvas, layout);
    draw_grid(&mut canvas);
    draw_segments(&mut canvas, layout);
    draw_remarks(&mut canvas, layout);
    draw_totals(&mut canvas, layout);
    draw_footer(&mut canvas, layout);

    canvas
}

fn draw_header(canvas: &mut Canvas, layout: &LogSheetLayout) {
    let header = &layout.header;

    canvas.text_centered(PAGE_WIDTH / 2, 24, &header.title, 3, BLACK);
    canvas.text(MARGIN, 70, &format!("MONTH/DAY/YEAR: {}", header.date), 2, BLACK);
    canvas.text(MARGIN, 96, &format!("DRIVER: {}", header.driver_name), 2, BLACK);
    canvas.text(MARGIN, 122, &format!("CARRIER: {}", header.carrier), 2, BLACK);
    canvas.text(MARGIN, 148, &format!("MAIN TERMINAL: {}", header.main_terminal), 2, BLACK);
    canvas.text(SIDE_COLUMN, 70, &format!("TRUCK/TRAILER: {}", header.vehicle_numbers), 2, BLACK);
    canvas.text(
        SIDE_COLUMN,
        96,
        &format!("TOTAL MILES DRIVING TODAY: {:.0}", layout.totals.miles),
        2,
        BLACK,
    );
}

fn draw_grid(canvas: &mut Canvas) {
    // Hour labels
    for hour in 0..=24u32 {
        let label = match hour {
            0 | 24 => "MID.".to_string(),
            12 => "NOON".to_string(),
            h => (h % 12).to_string(),
        };
        canvas.text_centered(GRID_LEFT + hour * HOUR_WIDTH, GRID_TOP - 16, &label, 1, BLACK);
    }

    // Quarter-hour ticks along the top of every lane
    for quarter in 0..96u32 {
        if quarter % 4 != 0 {
            let x = GRID_LEFT + quarter * HOUR_WIDTH / 4;
            for lane in 0..4u32 {
                let top = GRID_TOP + lane * LANE_HEIGHT;
                let len = if quarter % 2 == 0 { 10 } else { 6 };
                canvas.vline(x, top, top + len, 1, GRID_GREY);
            }
        }
    }

    for hour in 0..=24u32 {
        let thickness = if hour % 12 == 0 { 3 } else { 1 };
        canvas.vline(GRID_LEFT + hour * HOUR_WIDTH, GRID_TOP, GRID_BOTTOM, thickness, BLACK);
    }

    for lane in 0..=4u32 {
        canvas.hline(GRID_LEFT, GRID_RIGHT, GRID_TOP + lane * LANE_HEIGHT, 2, BLACK);
    }

    for status in DutyStatus::ALL {
        let y = lane_center(status) - GLYPH_HEIGHT / 2;
        canvas.text(MARGIN / 2, y, &status.label().to_uppercase(), 1, BLACK);
    }
}

fn draw_segments(canvas: &mut Canvas, layout: &LogSheetLayout) {
    let mut previous: Option<(u32, u32)> = None;

    for segment in &layout.segments {
        let y = lane_center(segment.status);
        let x0 = hour_x(segment.start_hour);
        let x1 = hour_x(segment.end_hour);

        // Status change connector
        if let Some((prev_x, prev_y)) = previous {
            if prev_y != y {
                canvas.vline(prev_x, prev_y, y, 2, BLACK);
            }
        }

        canvas.hline(x0, x1, y, BAR_THICKNESS, status_color(segment.status));
        previous = Some((x1, y));
    }
}

fn draw_remarks(canvas: &mut Canvas, layout: &LogSheetLayout) {
    canvas.text(MARGIN, REMARKS_TOP - 24, "REMARKS:", 2, BLACK);

    let mut y = REMARKS_TOP;
    for remark in &layout.remarks {
        let line: String = remark.display().chars().take(REMARK_MAX_CHARS).collect();
        canvas.text(MARGIN + 16, y, &line, 2, BLACK);
        y += REMARK_SPACING;
    }

    if layout.omitted_remarks > 0 {
        canvas.text(
            MARGIN + 16,
            y,
            &format!("(+{} MORE NOT SHOWN)", layout.omitted_remarks),
            2,
            GRID_GREY,
        );
    }
}

fn draw_totals(canvas: &mut Canvas, layout: &LogSheetLayout) {
    let totals = &layout.totals;
    let lines = [
        format!("LINE 3 (DRIVING): {} HRS", format_hours(totals.driving_hours)),
        format!("LINE 4 (ON DUTY): {} HRS", format_hours(totals.on_duty_not_driving_hours)),
        format!("TOTAL ON DUTY: {} HRS", format_hours(totals.on_duty_hours)),
        format!("MILES: {:.0}", totals.miles),
    ];

    canvas.text(SIDE_COLUMN, REMARKS_TOP - 24, "TOTALS", 2, BLACK);
    for (i, line) in lines.iter().enumerate() {
        canvas.text(SIDE_COLUMN, REMARKS_TOP + i as u32 * 24, line, 2, BLACK);
    }

    let recap = &layout.recap;
    let recap_top = REMARKS_TOP + 140;
    canvas.text(
        SIDE_COLUMN,
        recap_top,
        &format!("{:.0}-HOUR/8-DAY RECAP", recap.cycle_limit_hours),
        2,
        BLACK,
    );
    canvas.text(
        SIDE_COLUMN,
        recap_top + 28,
        &format!("ON DUTY THIS CYCLE: {}", format_hours(recap.on_duty_hours)),
        2,
        BLACK,
    );
    canvas.text(
        SIDE_COLUMN,
        recap_top + 52,
        &format!("HOURS AVAILABLE: {}", format_hours(recap.available_hours)),
        2,
        BLACK,
    );
}

fn draw_footer(canvas: &mut Canvas, layout: &LogSheetLayout) {
    canvas.text(
        MARGIN,
        PAGE_HEIGHT - 110,
        &format!("SHIPPING DOCUMENTS: {}", layout.shipping_documents),
        2,
        BLACK,
    );

    let y = PAGE_HEIGHT - 60;
    let label = "DRIVER SIGNATURE:";
    canvas.text(MARGIN, y, label, 2, BLACK);
    let line_start = MARGIN + font::text_width(label, 2) + 16;
    canvas.hline(line_start, line_start + 360, y + GLYPH_HEIGHT * 2, 2, BLACK);
    canvas.text(
        SIDE_COLUMN,
        y,
        &format!("DATE: {}", layout.header.date),
        2,
        BLACK,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips_to_canvas() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(8, 8, 5, 5, BLACK);

        assert_eq!(canvas.pixel(9, 9), BLACK);
        assert_eq!(canvas.pixel(7, 7), WHITE);
    }

    #[test]
    fn test_text_draws_glyph_pixels() {
        let mut canvas = Canvas::new(20, 10);
        canvas.text(0, 0, "|", 1, BLACK);

        // '|' is the centre column of every row
        for row in 0..GLYPH_HEIGHT {
            assert_eq!(canvas.pixel(2, row), BLACK);
            assert_eq!(canvas.pixel(0, row), WHITE);
        }
    }

    #[test]
    fn test_hour_x_spans_grid() {
        assert_eq!(hour_x(0.0), GRID_LEFT);
        assert_eq!(hour_x(24.0), GRID_RIGHT);
        assert_eq!(hour_x(12.0), GRID_LEFT + 12 * HOUR_WIDTH);
        assert_eq!(hour_x(30.0), GRID_RIGHT);
        assert!(GRID_RIGHT < PAGE_WIDTH);
    }

    #[test]
    fn test_png_signature() {
        let png = Canvas::new(4, 4).into_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
