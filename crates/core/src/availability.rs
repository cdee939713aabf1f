//! Free-interval derivation from busy calendar events
//!
//! Pure functions that turn a window plus the manager's busy events into
//! merged, ascending free intervals. Only working hours on weekdays count
//! as schedulable time.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use hireflow_domain::{FreeInterval, TimeWindow};

/// A busy calendar event as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Derive free intervals inside `window` from the given busy events.
///
/// Walks the window day by day, skips weekends, clips each day to the
/// `[work_start_hour, work_end_hour)` UTC working window and subtracts the
/// merged busy events. The result is ascending, non-overlapping and fully
/// contained in `window`.
pub fn compute_free_intervals(
    window: TimeWindow,
    busy: &[BusyEvent],
    work_start_hour: u32,
    work_end_hour: u32,
) -> Vec<FreeInterval> {
    if window.end <= window.start || work_end_hour <= work_start_hour {
        return Vec::new();
    }

    let busy = merge_busy(busy);
    let mut free = Vec::new();

    let mut day = window.start.date_naive();
    let last_day = window.end.date_naive();
    while day <= last_day {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let (day_start, day_end) = match working_window(day, work_start_hour, work_end_hour) {
                Some(bounds) => bounds,
                None => break,
            };
            let start = day_start.max(window.start);
            let end = day_end.min(window.end);
            if start < end {
                subtract_busy(start, end, &busy, &mut free);
            }
        }
        day += Duration::days(1);
    }

    free
}

/// Merge overlapping or adjacent busy events into a sorted disjoint list.
fn merge_busy(busy: &[BusyEvent]) -> Vec<BusyEvent> {
    let mut events: Vec<BusyEvent> =
        busy.iter().filter(|e| e.end > e.start).cloned().collect();
    events.sort_by_key(|e| e.start);

    let mut merged: Vec<BusyEvent> = Vec::with_capacity(events.len());
    for event in events {
        match merged.last_mut() {
            Some(last) if event.start <= last.end => {
                last.end = last.end.max(event.end);
            }
            _ => merged.push(event),
        }
    }
    merged
}

/// Working-hour bounds for a calendar day, in UTC.
fn working_window(
    day: chrono::NaiveDate,
    work_start_hour: u32,
    work_end_hour: u32,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveTime::from_hms_opt(work_start_hour, 0, 0)?;
    let end = NaiveTime::from_hms_opt(work_end_hour, 0, 0)?;
    Some((
        Utc.from_utc_datetime(&day.and_time(start)),
        Utc.from_utc_datetime(&day.and_time(end)),
    ))
}

/// Append the free parts of `[start, end)` after removing merged busy events.
fn subtract_busy(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    busy: &[BusyEvent],
    out: &mut Vec<FreeInterval>,
) {
    let mut cursor = start;
    for event in busy {
        if event.end <= cursor {
            continue;
        }
        if event.start >= end {
            break;
        }
        if event.start > cursor {
            out.push(FreeInterval::new(cursor, event.start.min(end)));
        }
        cursor = cursor.max(event.end);
        if cursor >= end {
            return;
        }
    }
    if cursor < end {
        out.push(FreeInterval::new(cursor, end));
    }
}
