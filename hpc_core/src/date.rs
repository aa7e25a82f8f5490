//! Conversion between iCalendar date tokens and timestamps.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ParseError;

static DATE_FORMAT: &str = "%Y%m%d";
static DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// A decoded `DTSTART`-like value.
///
/// The wall-clock value is kept exactly as written in the feed. A trailing `Z` is remembered in
/// `utc` and written back on encoding, no timezone conversion happens anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Date(NaiveDate),
    DateTime { value: NaiveDateTime, utc: bool },
}

impl Timestamp {
    /// The timestamp as a naive date-time, dates are at midnight.
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            Timestamp::Date(date) => date.and_time(NaiveTime::MIN),
            Timestamp::DateTime { value, .. } => *value,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Timestamp::Date(_))
    }
}

/// Decode `YYYYMMDD` or `YYYYMMDDTHHMMSS[Z]`.
///
/// Missing time fields of a short date-time token default to zero.
pub fn decode(raw: &str) -> Result<Timestamp, ParseError> {
    let token = raw.trim();
    let malformed = || ParseError::Malformed {
        token: token.to_string(),
    };
    let out_of_range = || ParseError::OutOfRange {
        token: token.to_string(),
    };
    let (body, utc) = match token.strip_suffix('Z') {
        Some(body) => (body, true),
        None => (token, false),
    };
    let (date_part, time_part) = match body.split_once('T') {
        Some((date_part, time_part)) => (date_part, Some(time_part)),
        None => (body, None),
    };
    let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if date_part.len() != 8 || !is_digits(date_part) {
        return Err(malformed());
    }
    let date = NaiveDate::from_ymd_opt(
        date_part[0..4].parse().map_err(|_| malformed())?,
        date_part[4..6].parse().map_err(|_| malformed())?,
        date_part[6..8].parse().map_err(|_| malformed())?,
    )
    .ok_or_else(out_of_range)?;
    let Some(time_part) = time_part else {
        return Ok(Timestamp::Date(date));
    };
    if time_part.len() > 6 || time_part.len() % 2 != 0 || !is_digits(time_part) {
        return Err(malformed());
    }
    let field = |index: usize| -> u32 {
        time_part
            .get(index..index + 2)
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0)
    };
    let time = NaiveTime::from_hms_opt(field(0), field(2), field(4)).ok_or_else(out_of_range)?;
    Ok(Timestamp::DateTime {
        value: date.and_time(time),
        utc,
    })
}

/// Encode a timestamp the way [`decode`] reads it.
pub fn encode(timestamp: &Timestamp) -> String {
    match timestamp {
        Timestamp::Date(date) => date.format(DATE_FORMAT).to_string(),
        Timestamp::DateTime { value, utc } => {
            let mut encoded = value.format(DATE_TIME_FORMAT).to_string();
            if *utc {
                encoded.push('Z');
            }
            encoded
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::{
        date::{decode, encode, Timestamp},
        error::ParseError,
    };

    fn date_time(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_decode_utc_date_time() {
        let decoded = decode("20231201T143000Z").unwrap();
        assert_eq!(
            decoded,
            Timestamp::DateTime {
                value: date_time("2023-12-01 14:30:00"),
                utc: true,
            }
        );
    }

    #[test]
    fn test_decode_floating_date_time() {
        let decoded = decode("20231201T143000").unwrap();
        assert_eq!(decoded.naive(), date_time("2023-12-01 14:30:00"));
        assert!(!decoded.is_date());
    }

    #[test]
    fn test_decode_date() {
        let decoded = decode("20231201").unwrap();
        assert_eq!(
            decoded,
            Timestamp::Date(NaiveDate::from_ymd_opt(2023, 12, 1).unwrap())
        );
        assert_eq!(decoded.naive(), date_time("2023-12-01 00:00:00"));
    }

    #[test]
    fn test_decode_short_time_defaults_to_zero() {
        let decoded = decode("20231201T14").unwrap();
        assert_eq!(decoded.naive(), date_time("2023-12-01 14:00:00"));
        let decoded = decode("20231201T1430").unwrap();
        assert_eq!(decoded.naive(), date_time("2023-12-01 14:30:00"));
    }

    #[test]
    fn test_decode_malformed() {
        for token in ["", "2023120", "2023AB01", "20231201T14300", "20231201T1430000", "2023-12-01"] {
            assert_eq!(
                decode(token),
                Err(ParseError::Malformed {
                    token: token.to_string()
                }),
                "{token:?}"
            );
        }
    }

    #[test]
    fn test_decode_out_of_range() {
        for token in ["20231301", "20230230", "20231201T250000"] {
            assert_eq!(
                decode(token),
                Err(ParseError::OutOfRange {
                    token: token.to_string()
                }),
                "{token:?}"
            );
        }
    }

    #[test]
    fn test_encode_inverts_decode() {
        for token in ["20231201T143000Z", "20231201T143000", "20240229"] {
            let decoded = decode(token).unwrap();
            assert_eq!(encode(&decoded), token);
            assert_eq!(decode(&encode(&decoded)).unwrap(), decoded);
        }
    }
}
