// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::models::{DoctorError, DoctorSummary};
use shared_utils::time;

pub const DEFAULT_DURATION_MINUTES: i32 = 30;
pub const ALLOWED_DURATIONS_MINUTES: [i32; 2] = [30, 60];

/// Longest bookable block. The conflict query widens its candidate window by
/// this much, so any stored appointment that could still overlap is fetched.
pub const MAX_DURATION_MINUTES: i64 = 60;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: Option<AppointmentType>,
    pub patient_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// End of the booked interval; no end column is stored.
    pub fn end_time(&self) -> DateTime<Utc> {
        time::add_minutes(self.start_time, self.duration_minutes as i64)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentType {
    #[serde(rename = "Routine Check-Up")]
    RoutineCheckUp,
    Ultrasound,
    Consultation,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl AppointmentType {
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::RoutineCheckUp => "Routine Check-Up",
            AppointmentType::Ultrasound => "Ultrasound",
            AppointmentType::Consultation => "Consultation",
            AppointmentType::FollowUp => "Follow-up",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Routine Check-Up" => Some(AppointmentType::RoutineCheckUp),
            "Ultrasound" => Some(AppointmentType::Ultrasound),
            "Consultation" => Some(AppointmentType::Consultation),
            "Follow-up" => Some(AppointmentType::FollowUp),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Time of day as "HH:MM"; parsed by the booking service so a malformed
    /// value surfaces as a validation error rather than a rejected body.
    pub time: String,
    pub duration_minutes: Option<i32>,
    pub appointment_type: Option<String>,
    pub patient_name: String,
    pub notes: Option<String>,
}

/// Allow-listed mutable fields. Anything else on the record (id, doctor_id,
/// timestamps) is never writable through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub appointment_type: Option<String>,
    pub patient_name: Option<String>,
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    /// Any change to when or how long the appointment runs re-enters full
    /// validation; other fields are applied as-is.
    pub fn requires_revalidation(&self) -> bool {
        self.date.is_some() || self.time.is_some() || self.duration_minutes.is_some()
    }
}

/// Read shape: the appointment with its doctor's summary resolved from the
/// registry. A dangling doctor reference renders as `doctor: null`.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentWithDoctor {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<DoctorSummary>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Cannot book appointments in the past")]
    PastAppointment,

    #[error("Appointments are only available between {} and {}", .start.format("%H:%M"), .end.format("%H:%M"))]
    OutsideWorkingHours { start: NaiveTime, end: NaiveTime },

    #[error("Selected time slot is not available")]
    SlotConflict,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Store request failed: {0}")]
    StoreFailure(String),
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::InvalidInput(msg) => AppointmentError::InvalidInput(msg),
            DoctorError::StoreFailure(msg) => AppointmentError::StoreFailure(msg),
        }
    }
}
