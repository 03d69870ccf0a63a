//! Stateless reservation rules. Each returns `BadRequest` with a readable
//! message on violation.

use chrono::{Days, NaiveDate, NaiveTime, Timelike};

use crate::config::Config;
use crate::engine::EngineError;
use crate::limits::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::model::TimeOfDay;
use crate::time::parse_time_of_day;

pub fn validate_date_within_window(
    date: NaiveDate,
    today: NaiveDate,
    max_advance_days: u32,
) -> Result<(), EngineError> {
    if date < today {
        return Err(EngineError::BadRequest(format!(
            "reservation date {date} is in the past"
        )));
    }
    let last = today
        .checked_add_days(Days::new(max_advance_days as u64))
        .unwrap_or(NaiveDate::MAX);
    if date > last {
        return Err(EngineError::BadRequest(format!(
            "reservation date {date} is more than {max_advance_days} days ahead"
        )));
    }
    Ok(())
}

pub fn validate_time_slot(time: NaiveTime, config: &Config) -> Result<(), EngineError> {
    let (hour, minute) = (time.hour(), time.minute());
    if hour > 23 || minute > 59 {
        return Err(EngineError::BadRequest(format!("invalid time {time}")));
    }
    let interval = config.slot_interval_minutes.max(1);
    if minute % interval != 0 {
        return Err(EngineError::BadRequest(format!(
            "reservations start every {interval} minutes; {hour:02}:{minute:02} is off-slot"
        )));
    }
    if hour < config.opening_hour || hour >= config.closing_hour {
        return Err(EngineError::BadRequest(format!(
            "reservations are accepted between {:02}:00 and {:02}:00",
            config.opening_hour, config.closing_hour
        )));
    }
    Ok(())
}

pub fn validate_party_size(party_size: u32) -> Result<(), EngineError> {
    if party_size == 0 {
        return Err(EngineError::BadRequest("party size must be at least 1".into()));
    }
    Ok(())
}

pub fn validate_duration(minutes: u32) -> Result<(), EngineError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(EngineError::BadRequest(format!(
            "duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes, got {minutes}"
        )));
    }
    Ok(())
}

/// Date, time-slot and duration rules in that order. Returns the parsed time.
pub fn validate_request(
    date: NaiveDate,
    time: &TimeOfDay,
    duration: u32,
    config: &Config,
    today: NaiveDate,
) -> Result<NaiveTime, EngineError> {
    validate_date_within_window(date, today, config.max_advance_days)?;
    let time = parse_time_of_day(time)?;
    validate_time_slot(time, config)?;
    validate_duration(duration)?;
    Ok(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn is_bad_request<T: std::fmt::Debug>(r: Result<T, EngineError>) -> bool {
        matches!(r, Err(EngineError::BadRequest(_)))
    }

    #[test]
    fn date_window_bounds_are_inclusive() {
        let t = today();
        assert!(validate_date_within_window(t, t, 90).is_ok());
        assert!(validate_date_within_window(t + Days::new(90), t, 90).is_ok());
        assert!(is_bad_request(validate_date_within_window(t + Days::new(91), t, 90)));
        assert!(is_bad_request(validate_date_within_window(t.pred_opt().unwrap(), t, 90)));
    }

    #[test]
    fn time_slot_granularity_and_hours() {
        let c = Config::default();
        assert!(validate_time_slot(hm(10, 0), &c).is_ok());
        assert!(validate_time_slot(hm(21, 30), &c).is_ok());
        assert!(is_bad_request(validate_time_slot(hm(19, 15), &c)));
        assert!(is_bad_request(validate_time_slot(hm(9, 30), &c)));
        // closing hour itself is excluded
        assert!(is_bad_request(validate_time_slot(hm(22, 0), &c)));
    }

    #[test]
    fn custom_slot_interval() {
        let c = Config {
            slot_interval_minutes: 10,
            ..Config::default()
        };
        assert!(validate_time_slot(hm(21, 10), &c).is_ok());
        assert!(is_bad_request(validate_time_slot(hm(21, 15), &c)));
    }

    #[test]
    fn party_size_must_be_positive() {
        assert!(is_bad_request(validate_party_size(0)));
        assert!(validate_party_size(1).is_ok());
    }

    #[test]
    fn duration_range() {
        assert!(is_bad_request(validate_duration(29)));
        assert!(validate_duration(30).is_ok());
        assert!(validate_duration(120).is_ok());
        assert!(validate_duration(360).is_ok());
        assert!(is_bad_request(validate_duration(361)));
    }

    #[test]
    fn validate_request_returns_parsed_time() {
        let c = Config::default();
        let t = validate_request(today(), &"19:00".into(), 120, &c, today()).unwrap();
        assert_eq!(t, hm(19, 0));
        assert!(is_bad_request(validate_request(today(), &"19:00".into(), 10, &c, today())));
        assert!(is_bad_request(validate_request(today(), &"nope".into(), 120, &c, today())));
    }
}
