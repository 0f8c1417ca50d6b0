// libs/doctor-cell/src/models.rs
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_utils::time::hhmm;

pub const DEFAULT_SPECIALIZATION: &str = "General";

// ==============================================================================
// CORE DOCTOR MODELS
// ==============================================================================

/// Daily booking window, time-of-day only. Appointments may start anywhere
/// in [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub working_hours: WorkingHours,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of a doctor embedded into appointment read responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
}

impl From<&Doctor> for DoctorSummary {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name.clone(),
            specialization: doctor.specialization.clone(),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialization: Option<String>,
    pub working_hours: Option<WorkingHoursRequest>,
}

/// Working hours as they arrive over the wire, "HH:MM" text. Parsed and
/// range-checked by the registry before anything is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkingHoursRequest {
    pub start: String,
    pub end: String,
}

// ==============================================================================
// STORE PROJECTIONS
// ==============================================================================

/// Appointment projection read when filtering slots. The appointments
/// collection belongs to the appointment cell; availability only needs the
/// occupied windows.
#[derive(Debug, Clone, Deserialize)]
pub struct BookedWindow {
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl BookedWindow {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + chrono::Duration::minutes(self.duration_minutes as i64)
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    StoreFailure(String),
}
