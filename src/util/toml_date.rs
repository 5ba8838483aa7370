use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use toml::value::Datetime;

// Code adapted from https://www.seachess.net/notes/toml-dates/
/// A TOML date or date-time as a naive wall-clock timestamp.
/// Offsets are dropped and a bare date is midnight. A bare time is rejected.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TomlDateTime(pub NaiveDateTime);

impl TryFrom<&Datetime> for TomlDateTime {
    type Error = String;

    fn try_from(value: &Datetime) -> Result<Self, Self::Error> {
        let Some(d) = value.date else {
            return Err(format!("A time without a date is not a timestamp: {}", value));
        };

        let date = NaiveDate::from_ymd_opt(d.year as i32, d.month as u32, d.day as u32)
            .ok_or_else(|| format!("Invalid date {}", value))?;
        let time = match value.time {
            Some(t) => NaiveTime::from_hms_opt(t.hour as u32, t.minute as u32, t.second as u32)
                .ok_or_else(|| format!("Invalid time {}", value))?,
            None => NaiveTime::MIN,
        };

        Ok(TomlDateTime(NaiveDateTime::new(date, time)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(value: &str) -> Result<TomlDateTime, String> {
        let datetime: Datetime = value.parse().unwrap();
        TomlDateTime::try_from(&datetime)
    }

    #[test]
    fn test_date_time() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 22).unwrap();
        assert_eq!(convert("2024-04-22"), Ok(TomlDateTime(date.and_hms_opt(0, 0, 0).unwrap())));

        let updated = NaiveDate::from_ymd_opt(2024, 4, 23).unwrap();
        assert_eq!(convert("2024-04-23T08:30:00+02:00"), Ok(TomlDateTime(updated.and_hms_opt(8, 30, 0).unwrap())));
        assert_eq!(convert("2024-04-23 08:30:00"), Ok(TomlDateTime(updated.and_hms_opt(8, 30, 0).unwrap())));
    }

    #[test]
    fn test_time_only_is_rejected() {
        let err = convert("07:32:00").unwrap_err();
        assert!(err.contains("07:32:00"), "{}", err);
    }
}
