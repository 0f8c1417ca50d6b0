use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Merge a calendar date with a wall-clock time into a single UTC instant.
pub fn combine(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

/// Shift an instant forward by a number of minutes.
pub fn add_minutes(instant: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    instant + Duration::minutes(minutes)
}

/// True interval overlap over half-open [start, end) spans.
///
/// Catches full containment as well as partial crossings, so a longer
/// interval straddling a shorter one counts even though neither endpoint
/// falls inside the other.
pub fn overlaps(
    start_a: DateTime<Utc>,
    end_a: DateTime<Utc>,
    start_b: DateTime<Utc>,
    end_b: DateTime<Utc>,
) -> bool {
    start_a < end_b && start_b < end_a
}

/// Whether `instant` falls within the half-open span [start, end).
pub fn contains(start: DateTime<Utc>, end: DateTime<Utc>, instant: DateTime<Utc>) -> bool {
    start <= instant && instant < end
}

/// Parse an "HH:MM" wall-clock value. Seconds-bearing "HH:MM:SS" input is
/// accepted as well.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Serde adapter for time-of-day fields carried as "HH:MM" strings, the
/// format the doctor records use for working hours.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_hhmm(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: {}", value)))
    }
}
