use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::values::Timestamp;

const DATE_TIME_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Errors from decoding a bar time stamp
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BarTimeError {
    #[error("Malformed bar time: {0}")]
    Malformed(String),

    #[error("Unsupported time zone: {0}")]
    UnsupportedTimeZone(String),
}

/// OHLCV bar, normalized to UTC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Decimal,
    pub wap: Decimal,
    pub count: i32,
}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time: Timestamp,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Decimal,
        wap: Decimal,
        count: i32,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            wap,
            count,
        }
    }

    /// Bar stamped with epoch seconds (realtime bars)
    #[allow(clippy::too_many_arguments)]
    pub fn from_epoch(
        epoch_secs: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Decimal,
        wap: Decimal,
        count: i32,
    ) -> Result<Self, BarTimeError> {
        let time = DateTime::from_timestamp(epoch_secs, 0)
            .ok_or_else(|| BarTimeError::Malformed(epoch_secs.to_string()))?;
        Ok(Self::new(time, open, high, low, close, volume, wap, count))
    }

    /// Price range of the bar
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Historical bar as delivered by the peer, with its date still encoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarData {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Decimal,
    pub wap: Decimal,
    pub bar_count: i32,
}

impl BarData {
    /// Decode the date and convert to a UTC [`Bar`]
    pub fn to_bar(&self) -> Result<Bar, BarTimeError> {
        Ok(Bar::new(
            parse_bar_time(&self.date)?,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.wap,
            self.bar_count,
        ))
    }
}

/// Parse a historical bar date into UTC.
///
/// Accepted shapes:
/// - `YYYYMMDD` (daily bars, midnight UTC)
/// - epoch seconds
/// - `YYYYMMDD HH:MM:SS` (taken as UTC)
/// - `YYYYMMDD HH:MM:SS <zone>` where zone is `UTC`, `GMT`, `Z`, `±HH:MM`
///   or an IANA name such as `US/Eastern`
pub fn parse_bar_time(raw: &str) -> Result<Timestamp, BarTimeError> {
    let raw = raw.trim();
    let malformed = || BarTimeError::Malformed(raw.to_string());

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if raw.len() == 8 {
            let date = NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|_| malformed())?;
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc())
                .ok_or_else(malformed);
        }
        let secs: i64 = raw.parse().map_err(|_| malformed())?;
        return DateTime::from_timestamp(secs, 0).ok_or_else(malformed);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT) {
        return Ok(naive.and_utc());
    }

    let (stamp, zone) = raw.rsplit_once(' ').ok_or_else(malformed)?;
    let naive = NaiveDateTime::parse_from_str(stamp.trim(), DATE_TIME_FORMAT)
        .map_err(|_| malformed())?;

    let utc = match parse_offset(zone) {
        Some(offset) => to_utc(&offset, &naive),
        None => to_utc(&parse_named_zone(zone)?, &naive),
    };
    utc.ok_or_else(malformed)
}

/// Local wall time to UTC. A repeated hour at a DST fall-back resolves to
/// its first occurrence; a skipped hour has no instant.
fn to_utc<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> Option<Timestamp> {
    zone.from_local_datetime(naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// `UTC`-like names and numeric `±HH:MM` / `±HHMM` offsets
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    if matches!(zone, "UTC" | "GMT" | "Z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, digits) = match zone.as_bytes().first() {
        Some(b'+') => (1, &zone[1..]),
        Some(b'-') => (-1, &zone[1..]),
        _ => return None,
    };

    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_named_zone(zone: &str) -> Result<Tz, BarTimeError> {
    Tz::from_str(zone).map_err(|_| BarTimeError::UnsupportedTimeZone(zone.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_utc_zone() {
        let time = parse_bar_time("20231201 09:30:00 UTC").unwrap();
        assert_eq!(time.to_rfc3339(), "2023-12-01T09:30:00+00:00");
    }

    #[test]
    fn test_parse_offset_zone() {
        let time = parse_bar_time("20231201 09:30:00 +02:00").unwrap();
        assert_eq!(time.hour(), 7);

        let time = parse_bar_time("20231201 09:30:00 -0500").unwrap();
        assert_eq!(time.hour(), 14);
    }

    #[test]
    fn test_parse_without_zone() {
        let time = parse_bar_time("20231201 16:00:00").unwrap();
        assert_eq!(time.hour(), 16);
    }

    #[test]
    fn test_parse_date_only_and_epoch() {
        let day = parse_bar_time("20231201").unwrap();
        assert_eq!(day.to_rfc3339(), "2023-12-01T00:00:00+00:00");

        let epoch = parse_bar_time("1701234567").unwrap();
        assert_eq!(epoch.timestamp(), 1701234567);
    }

    #[test]
    fn test_parse_named_zone() {
        // Eastern standard time in December, daylight time in July
        let winter = parse_bar_time("20231201 09:30:00 US/Eastern").unwrap();
        assert_eq!(winter.to_rfc3339(), "2023-12-01T14:30:00+00:00");

        let summer = parse_bar_time("20230703 09:30:00 America/New_York").unwrap();
        assert_eq!(summer.to_rfc3339(), "2023-07-03T13:30:00+00:00");

        let london = parse_bar_time("20231201 08:00:00 Europe/London").unwrap();
        assert_eq!(london.hour(), 8);
    }

    #[test]
    fn test_unknown_zone_rejected() {
        assert_eq!(
            parse_bar_time("20231201 09:30:00 Mars/Olympus"),
            Err(BarTimeError::UnsupportedTimeZone("Mars/Olympus".to_string()))
        );
        assert!(matches!(
            parse_bar_time("yesterday"),
            Err(BarTimeError::Malformed(_))
        ));
    }

    #[test]
    fn test_skipped_local_hour_is_malformed() {
        // 02:30 does not exist on the spring-forward day
        assert!(matches!(
            parse_bar_time("20230312 02:30:00 US/Eastern"),
            Err(BarTimeError::Malformed(_))
        ));
    }

    #[test]
    fn test_bar_data_to_bar() {
        let data = BarData {
            date: "20231201 09:30:00 UTC".to_string(),
            open: 150.0,
            high: 151.0,
            low: 149.5,
            close: 150.5,
            volume: dec!(1000),
            wap: dec!(150.25),
            bar_count: 10,
        };

        let bar = data.to_bar().unwrap();
        assert_eq!(bar.close, 150.5);
        assert_eq!(bar.range(), 1.5);
        assert_eq!(bar.count, 10);
    }
}
