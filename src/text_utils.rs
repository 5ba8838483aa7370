use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses the timestamp forms found in post headers:
/// `2017-09-10`, `2017-09-10 10:42`, `2017-09-10 10:42:32.123`, `2017-09-10T10:42:32`,
/// `2017-09-10 10:42:32 +0800` and RFC 3339. Offsets are dropped, keeping the wall-clock time as written.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    lazy_static! {
        static ref DATE_TIME_REGEX: Regex = Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.\d+)?)?(?:\s*(?:[+-]\d{2}:?\d{2}|Z))?)?$"
        ).unwrap();
    }

    let buf = buf.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(buf) {
        return Ok(date_time.naive_local());
    }

    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);
    let opt_u32 = |idx: usize| caps.get(idx).map_or(Ok(0), |m| to_u32(m.as_str()));

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = opt_u32(4)?;
    let mn: u32 = opt_u32(5)?;
    let s: u32 = opt_u32(6)?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

pub fn format_date_time(date_time: &NaiveDateTime) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let date_time = parse_date_time("2017-09-10 10:42:32.123").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");

        let date_time = parse_date_time("2017-09-10 10:42:32").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");

        let date_time = parse_date_time("2017-09-10T10:42:32").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");
    }

    #[test]
    fn test_parse_partial_date_time() {
        let date_time = parse_date_time("2021-3-7").unwrap();
        assert_eq!(format_date_time(&date_time), ("2021-03-07".to_string(), "00:00:00".to_string()));

        let date_time = parse_date_time(" 2021-03-07 09:15 ").unwrap();
        assert_eq!(format_date_time(&date_time), ("2021-03-07".to_string(), "09:15:00".to_string()));
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        let date_time = parse_date_time("2020-05-22T21:30:00+08:00").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2020-05-22");
        assert_eq!(time, "21:30:00");
    }

    #[test]
    fn test_parse_spaced_offset_keeps_wall_clock() {
        for buf in ["2023-01-01 10:00:00 +0800", "2023-01-01 10:00:00 -03:00", "2023-01-01 10:00:00+0800",
            "2023-01-01 10:00 +0800", "2023-01-01T10:00:00Z"] {
            let date_time = parse_date_time(buf).unwrap();
            assert_eq!(format_date_time(&date_time), ("2023-01-01".to_string(), "10:00:00".to_string()), "{}", buf);
        }

        assert!(parse_date_time("2023-01-01 +0800").is_err());
        assert!(parse_date_time("2023-01-01 10:00:00 +08").is_err());
    }

    #[test]
    fn test_parse_invalid_date_time() {
        assert!(parse_date_time("2021-13-01").is_err());
        assert!(parse_date_time("2021-02-30 10:00").is_err());
        assert!(parse_date_time("2021-02-01 25:00").is_err());
        assert!(parse_date_time("yesterday").is_err());
        assert!(parse_date_time("").is_err());
    }
}
