//! Age derivation from a stored birth date.

use chrono::{DateTime, Datelike, NaiveDate};

use crate::error::AgeError;

/// Shown wherever an age cannot be derived.
pub const AGE_UNAVAILABLE: &str = "N/A";

/// Parse `birth_date` and return the completed years as of `today`.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `MM/DD/YYYY`.
pub fn calculate_age(birth_date: &str, today: NaiveDate) -> Result<u32, AgeError> {
  let born = parse_birth_date(birth_date)?;
  if born > today {
    return Err(AgeError::InTheFuture);
  }

  let mut years = today.year() - born.year();
  if (today.month(), today.day()) < (born.month(), born.day()) {
    years -= 1;
  }
  u32::try_from(years).map_err(|_| AgeError::InTheFuture)
}

/// The age as display text, or [`AGE_UNAVAILABLE`].
pub fn age_label(birth_date: Option<&str>, today: NaiveDate) -> String {
  birth_date
    .ok_or(AgeError::Empty)
    .and_then(|b| calculate_age(b, today))
    .map(|age| age.to_string())
    .unwrap_or_else(|e| {
      tracing::debug!("age unavailable: {e}");
      AGE_UNAVAILABLE.to_string()
    })
}

fn parse_birth_date(input: &str) -> Result<NaiveDate, AgeError> {
  let s = input.trim();
  if s.is_empty() {
    return Err(AgeError::Empty);
  }
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Ok(d);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.date_naive());
  }
  if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
    return Ok(d);
  }
  Err(AgeError::Unparseable(s.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  #[test]
  fn counts_completed_years() {
    let today = day(2024, 6, 15);
    assert_eq!(calculate_age("2000-06-15", today), Ok(24));
    assert_eq!(calculate_age("2000-06-16", today), Ok(23));
    assert_eq!(calculate_age("2000-01-01", today), Ok(24));
  }

  #[test]
  fn accepts_timestamps_and_us_dates() {
    let today = day(2024, 6, 15);
    assert_eq!(calculate_age("1990-12-31T23:00:00Z", today), Ok(33));
    assert_eq!(calculate_age("03/04/1999", today), Ok(25));
  }

  #[test]
  fn leap_day_birthdays() {
    assert_eq!(calculate_age("2000-02-29", day(2023, 2, 28)), Ok(22));
    assert_eq!(calculate_age("2000-02-29", day(2023, 3, 1)), Ok(23));
  }

  #[test]
  fn malformed_input_fails_gracefully() {
    let today = day(2024, 6, 15);
    assert_eq!(calculate_age("", today), Err(AgeError::Empty));
    assert!(matches!(
      calculate_age("not a date", today),
      Err(AgeError::Unparseable(_))
    ));
    assert_eq!(calculate_age("2030-01-01", today), Err(AgeError::InTheFuture));
  }

  #[test]
  fn label_falls_back_to_na() {
    let today = day(2024, 6, 15);
    assert_eq!(age_label(None, today), "N/A");
    assert_eq!(age_label(Some("31/31/31"), today), "N/A");
    assert_eq!(age_label(Some("2000-06-15"), today), "24");
  }
}
