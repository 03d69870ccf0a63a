//! Pure time arithmetic. Every helper takes its inputs by value and returns
//! a fresh `Ms`; nothing here mutates a caller's date or timestamp.
//!
//! Dates and times are treated as already normalized to the restaurant's
//! local zone and mapped onto the epoch without a further offset, so all
//! comparisons happen on plain integers.

use chrono::{Local, NaiveDate, NaiveTime, Timelike};

use crate::engine::EngineError;
use crate::model::{MINUTE_MS, Ms, TimeOfDay};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse `HH:mm` or `HH:mm:ss`.
fn parse_clock(text: &str) -> Result<NaiveTime, EngineError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .map_err(|_| EngineError::BadRequest(format!("invalid time format: {text:?} (expected HH:mm)")))
}

pub fn parse_time_of_day(time: &TimeOfDay) -> Result<NaiveTime, EngineError> {
    match time {
        TimeOfDay::Clock(t) => Ok(*t),
        TimeOfDay::Embedded(ts) => Ok(ts.time()),
        TimeOfDay::Text(s) => parse_clock(s),
    }
}

/// Date + hour/minute of `time`, seconds and millis zeroed.
pub(crate) fn combine_naive(date: NaiveDate, time: NaiveTime) -> Ms {
    let start = date.and_time(NaiveTime::MIN);
    let minutes = time.hour() as i64 * 60 + time.minute() as i64;
    start.and_utc().timestamp_millis() + minutes * MINUTE_MS
}

pub fn combine_date_and_time(date: NaiveDate, time: &TimeOfDay) -> Result<Ms, EngineError> {
    Ok(combine_naive(date, parse_time_of_day(time)?))
}

pub fn add_minutes(ts: Ms, n: i64) -> Ms {
    ts + n * MINUTE_MS
}

pub fn start_of_day(date: NaiveDate) -> Ms {
    combine_naive(date, NaiveTime::MIN)
}

/// Last millisecond of `date`.
pub fn end_of_day(date: NaiveDate) -> Ms {
    start_of_day(date) + 24 * 60 * MINUTE_MS - 1
}

/// True iff `[start_a, end_a)` and `[start_b, end_b)` intersect once each is
/// widened outward by `buffer_minutes` on both ends.
pub fn overlaps(start_a: Ms, end_a: Ms, start_b: Ms, end_b: Ms, buffer_minutes: u32) -> bool {
    overlaps_ms(start_a, end_a, start_b, end_b, buffer_minutes as Ms * MINUTE_MS)
}

pub fn overlaps_ms(start_a: Ms, end_a: Ms, start_b: Ms, end_b: Ms, pad: Ms) -> bool {
    (start_a - pad) < (end_b + pad) && (start_b - pad) < (end_a + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: Ms = 60 * MINUTE_MS;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn combine_accepts_every_time_shape() {
        let base = start_of_day(date());
        let expected = base + 19 * H + 30 * MINUTE_MS;

        assert_eq!(combine_date_and_time(date(), &"19:30".into()).unwrap(), expected);
        assert_eq!(combine_date_and_time(date(), &"19:30:45".into()).unwrap(), expected);
        assert_eq!(combine_date_and_time(date(), &hm(19, 30).into()).unwrap(), expected);

        // Only the time part of an embedded timestamp is used.
        let other_day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let embedded = other_day.and_hms_milli_opt(19, 30, 12, 345).unwrap();
        assert_eq!(combine_date_and_time(date(), &embedded.into()).unwrap(), expected);
    }

    #[test]
    fn combine_rejects_garbage() {
        for bad in ["", "7pm", "25:00", "12:61", "noon"] {
            let err = combine_date_and_time(date(), &bad.into()).unwrap_err();
            assert!(matches!(err, EngineError::BadRequest(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn add_minutes_round_trips() {
        let ts = combine_date_and_time(date(), &"21:10".into()).unwrap();
        for n in [-600, -15, 0, 1, 45, 360, 10_000] {
            assert_eq!(add_minutes(add_minutes(ts, n), -n), ts);
        }
    }

    #[test]
    fn day_boundaries() {
        let d = date();
        let next = d.succ_opt().unwrap();
        assert_eq!(end_of_day(d) + 1, start_of_day(next));
        assert!(start_of_day(d) < combine_naive(d, hm(0, 1)));
    }

    #[test]
    fn overlaps_is_symmetric() {
        let cases = [
            (0, 10, 10, 20, 0),
            (0, 10, 10, 20, 1),
            (0, 100, 40, 60, 0),
            (0, 10, 50, 60, 15),
            (0, 10, 200, 300, 5),
        ];
        for (s1, e1, s2, e2, b) in cases {
            let (s1, e1, s2, e2) = (s1 * MINUTE_MS, e1 * MINUTE_MS, s2 * MINUTE_MS, e2 * MINUTE_MS);
            assert_eq!(overlaps(s1, e1, s2, e2, b), overlaps(s2, e2, s1, e1, b));
        }
    }

    #[test]
    fn buffer_pads_both_windows() {
        let existing_start = 19 * H;
        let existing_end = 21 * H;

        // Each side padded by 15 → any start before 21:30 touches the 19:00–21:00 seating.
        let at = |h: Ms, m: Ms| h * H + m * MINUTE_MS;
        assert!(overlaps(existing_start, existing_end, at(21, 10), at(22, 10), 15));
        assert!(overlaps(existing_start, existing_end, at(21, 20), at(22, 20), 15));
        assert!(!overlaps(existing_start, existing_end, at(21, 30), at(22, 30), 15));

        // Without buffer, back-to-back is fine.
        assert!(!overlaps(existing_start, existing_end, at(21, 0), at(22, 0), 0));
    }
}
