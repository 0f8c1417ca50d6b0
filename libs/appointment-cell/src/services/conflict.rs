// libs/appointment-cell/src/services/conflict.rs
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_utils::time;

use crate::models::{Appointment, AppointmentError, MAX_DURATION_MINUTES};

pub struct ConflictDetectionService {
    store: StoreClient,
}

impl ConflictDetectionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Every appointment for the doctor whose booked interval overlaps the
    /// candidate [start, end) window. `exclude_appointment_id` keeps a
    /// rescheduled appointment from conflicting with itself.
    pub async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            doctor_id, start_time, end_time
        );

        // Records carry no end column, so fetch everything that starts inside
        // (start - MAX_DURATION, end) and test the exact intervals here. An
        // appointment starting outside that window cannot reach the candidate.
        let window_start = time::add_minutes(start_time, -MAX_DURATION_MINUTES);

        let mut query_parts = vec![
            format!("doctor_id=eq.{}", doctor_id),
            format!(
                "start_time=gt.{}",
                urlencoding::encode(&window_start.to_rfc3339())
            ),
            format!(
                "start_time=lt.{}",
                urlencoding::encode(&end_time.to_rfc3339())
            ),
        ];

        if let Some(exclude_id) = exclude_appointment_id {
            query_parts.push(format!("id=neq.{}", exclude_id));
        }

        let path = format!(
            "/appointments?{}&order=start_time.asc",
            query_parts.join("&")
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::StoreFailure(e.to_string()))?;

        let candidates: Vec<Appointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::StoreFailure(format!("Failed to parse appointments: {}", e))
            })?;

        Ok(candidates
            .into_iter()
            .filter(|existing| {
                time::overlaps(
                    existing.start_time,
                    existing.end_time(),
                    start_time,
                    end_time,
                )
            })
            .collect())
    }
}
