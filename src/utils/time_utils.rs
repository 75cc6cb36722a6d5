use chrono::{DateTime, SecondsFormat, SubsecRound, TimeZone, Utc};

// The sitemap only wants the day.
const DATE_FORMAT_USCOMPACT: &str = "%Y-%m-%d";

pub enum DateFormat {
  Rfc3339,
  USCompact,
}

// Sub-second precision is dropped so that every backing
// store (the SQLite one keeps seconds) gives back exactly
// what was saved.
// Every backend keeps dates to the second (SQLite stores a
// UNIX timestamp), so that's all we ever hold.
pub fn whole_seconds(date: DateTime<Utc>) -> DateTime<Utc> {
  date.trunc_subsecs(0)
}

pub fn now() -> DateTime<Utc> {
  whole_seconds(Utc::now())
}

pub fn current_timestamp() -> i64 {
  Utc::now().timestamp()
}

pub fn timestamp_to_date(timestamp: i64) -> Option<DateTime<Utc>> {
  Utc.timestamp_opt(timestamp, 0).single()
}

pub fn date_to_string(date: &DateTime<Utc>, format: DateFormat) -> String {
  match format {
    DateFormat::Rfc3339 => date.to_rfc3339_opts(SecondsFormat::Secs, true),
    DateFormat::USCompact => date.format(DATE_FORMAT_USCOMPACT).to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn utc_date_formats_as_expected() {
    let date = timestamp_to_date(1615150740).unwrap();
    assert_eq!(
      "2021-03-07T20:59:00Z",
      date_to_string(&date, DateFormat::Rfc3339)
    );
    assert_eq!("2021-03-07", date_to_string(&date, DateFormat::USCompact));
  }

  #[test]
  fn whole_seconds_drops_the_fraction() {
    let date: DateTime<Utc> = "2024-01-15T10:00:00.500Z".parse().unwrap();
    assert_eq!(
      "2024-01-15T10:00:00Z",
      date_to_string(&whole_seconds(date), DateFormat::Rfc3339)
    );
  }

  #[test]
  fn now_has_no_subseconds() {
    assert_eq!(0, now().timestamp_subsec_nanos());
  }
}
