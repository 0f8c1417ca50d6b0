use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_utils::time;

use crate::models::{BookedWindow, DoctorError, WorkingHours};
use crate::services::doctor::DoctorService;

pub const DEFAULT_SLOT_MINUTES: i64 = 30;

pub struct AvailabilityService {
    store: StoreClient,
    doctors: DoctorService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            doctors: DoctorService::new(config),
        }
    }

    /// Free slot start times for a doctor on one calendar day, earliest
    /// first. Recomputed from the registry window and the day's bookings on
    /// every call; an empty day returns the full grid, a full day returns
    /// an empty list.
    pub async fn list_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, DoctorError> {
        let doctor = self.doctors.get_doctor(doctor_id).await?;
        let booked = self.booked_windows(doctor_id, date).await?;

        let slots = compute_free_slots(&doctor.working_hours, date, &booked, DEFAULT_SLOT_MINUTES);

        debug!(
            "{} free slots for doctor {} on {} ({} booked)",
            slots.len(),
            doctor_id,
            date,
            booked.len()
        );

        Ok(slots)
    }

    /// Appointments occupying the doctor's day, fetched over the half-open
    /// window [00:00, next day 00:00).
    async fn booked_windows(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookedWindow>, DoctorError> {
        let day_start = time::combine(date, NaiveTime::MIN);
        let day_end = time::add_minutes(day_start, 24 * 60);

        let path = format!(
            "/appointments?doctor_id=eq.{}&start_time=gte.{}&start_time=lt.{}&order=start_time.asc",
            doctor_id,
            urlencoding::encode(&day_start.to_rfc3339()),
            urlencoding::encode(&day_end.to_rfc3339()),
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::StoreFailure(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    DoctorError::StoreFailure(format!("Failed to parse booked window: {}", e))
                })
            })
            .collect()
    }
}

/// Walk the slot grid from the window start; a slot must fit entirely inside
/// the window, and is dropped when its start or end lands inside a booked
/// [start, end) span.
fn compute_free_slots(
    hours: &WorkingHours,
    date: NaiveDate,
    booked: &[BookedWindow],
    slot_minutes: i64,
) -> Vec<NaiveTime> {
    let window_start = time::combine(date, hours.start);
    let window_end = time::combine(date, hours.end);

    let mut slots = Vec::new();
    let mut slot_start = window_start;

    while time::add_minutes(slot_start, slot_minutes) <= window_end {
        let slot_end = time::add_minutes(slot_start, slot_minutes);

        let blocked = booked.iter().any(|window| {
            let booked_start = window.start_time;
            let booked_end = window.end_time();

            time::contains(booked_start, booked_end, slot_start)
                || time::contains(booked_start, booked_end, slot_end)
        });

        if !blocked {
            slots.push(slot_start.time());
        }

        slot_start = slot_end;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(start: (u32, u32), end: (u32, u32)) -> WorkingHours {
        WorkingHours {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn booked_at(hour: u32, minute: u32, duration_minutes: i32) -> BookedWindow {
        BookedWindow {
            start_time: time::combine(day(), NaiveTime::from_hms_opt(hour, minute, 0).unwrap()),
            duration_minutes,
        }
    }

    fn rendered(slots: &[NaiveTime]) -> Vec<String> {
        slots.iter().map(|s| s.format("%H:%M").to_string()).collect()
    }

    #[test]
    fn empty_day_yields_full_grid() {
        let slots = compute_free_slots(&hours((9, 0), (17, 0)), day(), &[], 30);

        assert_eq!(slots.len(), 16);
        assert_eq!(slots.first().map(|s| s.format("%H:%M").to_string()).unwrap(), "09:00");
        assert_eq!(slots.last().map(|s| s.format("%H:%M").to_string()).unwrap(), "16:30");

        // Ascending, 30 minutes apart, no duplicates.
        for pair in slots.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::minutes(30));
        }
    }

    #[test]
    fn hour_long_booking_blocks_adjacent_slots() {
        let slots = compute_free_slots(&hours((9, 0), (17, 0)), day(), &[booked_at(10, 0, 60)], 30);
        let rendered = rendered(&slots);

        // The 09:30 slot ends exactly on the booked start boundary and is
        // blocked; 11:00 starts exactly on the booked end and is free.
        assert!(!rendered.contains(&"09:30".to_string()));
        assert!(!rendered.contains(&"10:00".to_string()));
        assert!(!rendered.contains(&"10:30".to_string()));
        assert!(rendered.contains(&"09:00".to_string()));
        assert!(rendered.contains(&"11:00".to_string()));
        assert_eq!(slots.len(), 13);
    }

    #[test]
    fn partial_trailing_window_is_not_offered() {
        // 17:20 end leaves no room for a full slot after 16:30.
        let slots = compute_free_slots(&hours((9, 0), (17, 20)), day(), &[], 30);
        assert_eq!(rendered(&slots).last().unwrap(), "16:30");

        // A window divisible into clean slots keeps its last one.
        let slots = compute_free_slots(&hours((9, 0), (17, 30)), day(), &[], 30);
        assert_eq!(rendered(&slots).last().unwrap(), "17:00");
    }

    #[test]
    fn fully_booked_day_yields_nothing() {
        let bookings: Vec<BookedWindow> = (0..8).map(|i| booked_at(9 + i, 0, 60)).collect();
        let slots = compute_free_slots(&hours((9, 0), (17, 0)), day(), &bookings, 30);
        assert!(slots.is_empty());
    }
}
