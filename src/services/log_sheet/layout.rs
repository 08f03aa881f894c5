//! Log sheet content, computed before any pixel is drawn

use serde::Serialize;

use crate::types::{DayLog, DutyStatus};

pub const PAGE_WIDTH: u32 = 1100;
pub const PAGE_HEIGHT: u32 = 850;

/// Remarks beyond this many are left off the sheet
pub const MAX_REMARKS: usize = 15;


pub const TITLE: &str = "DRIVER'S DAILY LOG";
pub const CARRIER_PLACEHOLDER: &str = "YOUR TRUCKING COMPANY LTD";
pub const MAIN_TERMINAL_PLACEHOLDER: &str = "123 TRUCK AVE";
pub const VEHICLE_PLACEHOLDER: &str = "T-001 / TL-456";
pub const SHIPPING_DOCUMENTS_PLACEHOLDER: &str = "BOL #123 | Shipper: Sample Co.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetHeader {
    pub title: String,
    /// MM/DD/YYYY
    pub date: String,
    /// Upper-cased
    pub driver_name: String,
    pub carrier: String,
    pub main_terminal: String,
    pub vehicle_numbers: String,
}

/// One bar on a duty lane, in hours since midnight
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneSegment {
    pub status: DutyStatus,
    pub start_hour: f64,
    pub end_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemarkLine {
    /// HH:MM
    pub time: String,
    pub text: String,
}

impl RemarkLine {
    pub fn display(&self) -> String {
        format!("{} - {}", self.time, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTotals {
    pub driving_hours: f64,
    pub on_duty_not_driving_hours: f64,
    pub on_duty_hours: f64,
    pub miles: f64,
}

/// 70-hour/8-day recap
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecap {
    pub cycle_limit_hours: f64,
    pub on_duty_hours: f64,
    pub available_hours: f64,
}

/// Everything printed on one day's sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSheetLayout {
    pub header: SheetHeader,
    pub segments: Vec<LaneSegment>,
    pub remarks: Vec<RemarkLine>,
    pub omitted_remarks: usize,
    pub totals: SheetTotals,
    pub recap: CycleRecap,
    pub shipping_documents: String,
}

impl LogSheetLayout {
    /// `cycle_limit_hours` is the limit the day was simulated against
    pub fn build(day: &DayLog, driver_name: &str, cycle_limit_hours: f64) -> Self {
        let header = SheetHeader {
            title: TITLE.to_string(),
            date: day.date.format("%m/%d/%Y").to_string(),
            driver_name: driver_name.trim().to_uppercase(),
            carrier: CARRIER_PLACEHOLDER.to_string(),
            main_terminal: MAIN_TERMINAL_PLACEHOLDER.to_string(),
            vehicle_numbers: VEHICLE_PLACEHOLDER.to_string(),
        };

        let segments = day
            .intervals
            .iter()
            .map(|i| LaneSegment {
                status: i.status,
                start_hour: i.start_offset,
                end_hour: i.end_offset(),
            })
            .collect();

        let remarks: Vec<RemarkLine> = day
            .intervals
            .iter()
            .take(MAX_REMARKS)
            .map(|i| RemarkLine {
                time: format_clock(i.start_offset),
                text: i.remark.clone(),
            })
            .collect();
        let omitted_remarks = day.intervals.len().saturating_sub(remarks.len());

        let driving_hours = day.driving_hours();
        let on_duty_not_driving_hours = day.hours_in(DutyStatus::OnDutyNotDriving);
        let totals = SheetTotals {
            driving_hours,
            on_duty_not_driving_hours,
            on_duty_hours: driving_hours + on_duty_not_driving_hours,
            miles: day.miles_driven,
        };

        let recap = CycleRecap {
            cycle_limit_hours,
            on_duty_hours: day.cycle_hours_at_end,
            available_hours: (cycle_limit_hours - day.cycle_hours_at_end).max(0.0),
        };

        Self {
            header,
            segments,
            remarks,
            omitted_remarks,
            totals,
            recap,
            shipping_documents: SHIPPING_DOCUMENTS_PLACEHOLDER.to_string(),
        }
    }
}

/// `HH:MM` for a fractional hour of day. Minutes are rounded; a rounded 60
/// carries into the hour.
pub fn format_clock(hour: f64) -> String {
    let mut whole = hour.max(0.0).floor() as u32;
    let mut minutes = ((hour.max(0.0) - f64::from(whole)) * 60.0).round() as u32;
    if minutes >= 60 {
        whole += 1;
        minutes = 0;
    }
    format!("{:02}:{:02}", whole, minutes)
}

/// Hours with one decimal, as printed in the totals block
pub fn format_hours(hours: f64) -> String {
    format!("{:.1}", hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DutyStatusInterval;
    use chrono::NaiveDate;

    fn interval(start: f64, hours: f64, status: DutyStatus, remark: &str) -> DutyStatusInterval {
        DutyStatusInterval {
            start_offset: start,
            duration_hours: hours,
            status,
            remark: remark.to_string(),
        }
    }

    fn day(intervals: Vec<DutyStatusInterval>, miles: f64, cycle: f64) -> DayLog {
        DayLog {
            date: NaiveDate::from_ymd_opt(2025, 11, 17).unwrap(),
            intervals,
            miles_driven: miles,
            cycle_hours_at_end: cycle,
        }
    }

    #[test]
    fn test_morning_drive_remark_and_totals() {
        let log = day(
            vec![interval(6.0, 4.0, DutyStatus::Driving, "Driving to pickup")],
            220.0,
            4.0,
        );
        let layout = LogSheetLayout::build(&log, "Jane Roe", 70.0);

        assert_eq!(layout.remarks.len(), 1);
        assert_eq!(layout.remarks[0].time, "06:00");
        assert_eq!(layout.remarks[0].display(), "06:00 - Driving to pickup");
        assert_eq!(layout.totals.driving_hours, 4.0);
        assert_eq!(layout.totals.on_duty_not_driving_hours, 0.0);
        assert_eq!(layout.totals.on_duty_hours, 4.0);
        assert_eq!(layout.totals.miles, 220.0);
        assert_eq!(layout.segments[0].start_hour, 6.0);
        assert_eq!(layout.segments[0].end_hour, 10.0);
    }

    #[test]
    fn test_header_fields() {
        let layout = LogSheetLayout::build(&day(vec![], 0.0, 0.0), "  Jane Roe ", 70.0);

        assert_eq!(layout.header.date, "11/17/2025");
        assert_eq!(layout.header.driver_name, "JANE ROE");
        assert_eq!(layout.header.carrier, CARRIER_PLACEHOLDER);
        assert_eq!(layout.header.vehicle_numbers, "T-001 / TL-456");
    }

    #[test]
    fn test_remarks_capped() {
        let intervals = (0..20)
            .map(|i| {
                let status = if i % 2 == 0 { DutyStatus::Driving } else { DutyStatus::OnDutyNotDriving };
                interval(f64::from(i), 1.0, status, &format!("stop {}", i))
            })
            .collect();
        let layout = LogSheetLayout::build(&day(intervals, 0.0, 0.0), "Driver", 70.0);

        assert_eq!(layout.remarks.len(), MAX_REMARKS);
        assert_eq!(layout.omitted_remarks, 5);
        assert_eq!(layout.remarks.last().unwrap().text, "stop 14");
        assert_eq!(layout.segments.len(), 20, "every interval is still drawn");
    }

    #[test]
    fn test_recap_from_cycle_hours() {
        let layout = LogSheetLayout::build(&day(vec![], 0.0, 48.25), "Driver", 70.0);

        assert_eq!(layout.recap.on_duty_hours, 48.25);
        assert_eq!(layout.recap.available_hours, 21.75);
    }

    #[test]
    fn test_recap_uses_configured_cycle_limit() {
        let layout = LogSheetLayout::build(&day(vec![], 0.0, 48.25), "Driver", 60.0);

        assert_eq!(layout.recap.cycle_limit_hours, 60.0);
        assert_eq!(layout.recap.available_hours, 11.75);

        let over = LogSheetLayout::build(&day(vec![], 0.0, 65.0), "Driver", 60.0);
        assert_eq!(over.recap.available_hours, 0.0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(6.5), "06:30");
        assert_eq!(format_clock(13.25), "13:15");
        assert_eq!(format_clock(7.0 + 400.0 / 55.0), "14:16");
    }

    #[test]
    fn test_format_clock_carries_rounded_minutes() {
        // 9:59:45 rounds to 10:00, not 09:60
        assert_eq!(format_clock(9.0 + 59.75 / 60.0), "10:00");
    }

    #[test]
    fn test_layout_is_deterministic() {
        let log = day(
            vec![
                interval(0.0, 6.5, DutyStatus::OffDuty, "Off duty"),
                interval(6.5, 0.5, DutyStatus::OnDutyNotDriving, "Pre-trip inspection"),
                interval(7.0, 4.2, DutyStatus::Driving, "Driving to pickup"),
            ],
            231.0,
            4.7,
        );

        assert_eq!(LogSheetLayout::build(&log, "A", 70.0), LogSheetLayout::build(&log, "A", 70.0));
    }
}
