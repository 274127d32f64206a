use chrono::{DateTime, NaiveDate, Utc, Weekday};

/// This is the standard way of displaying a date in habitrack.
pub fn display_date(moment: DateTime<Utc>) -> String {
    moment.format("%Y-%m-%d").to_string()
}

/// Monday of the iso week the date falls into.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}
