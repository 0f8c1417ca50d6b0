// libs/appointment-cell/src/services/booking.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::{Doctor, DoctorError, DoctorSummary};
use doctor_cell::services::doctor::DoctorService;
use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_utils::time;

use crate::models::{
    Appointment, AppointmentError, AppointmentType, AppointmentWithDoctor,
    BookAppointmentRequest, UpdateAppointmentRequest, ALLOWED_DURATIONS_MINUTES,
    DEFAULT_DURATION_MINUTES,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::locks::DoctorScheduleLocks;

pub struct BookingService {
    store: StoreClient,
    doctor_service: DoctorService,
    conflict_service: ConflictDetectionService,
    locks: Arc<DoctorScheduleLocks>,
}

impl BookingService {
    pub fn new(config: &AppConfig, locks: Arc<DoctorScheduleLocks>) -> Self {
        Self {
            store: StoreClient::new(config),
            doctor_service: DoctorService::new(config),
            conflict_service: ConflictDetectionService::new(config),
            locks,
        }
    }

    /// Book a new appointment. Input shape is checked first, then the doctor
    /// is resolved, and the schedule rules plus the conflict check run under
    /// that doctor's lock so the check and the insert are atomic.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment with doctor {} on {} at {}",
            request.doctor_id, request.date, request.time
        );

        let patient_name = request.patient_name.trim();
        if patient_name.is_empty() {
            return Err(AppointmentError::InvalidInput(
                "Patient name must not be empty".to_string(),
            ));
        }

        let duration_minutes = request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if !ALLOWED_DURATIONS_MINUTES.contains(&duration_minutes) {
            return Err(AppointmentError::InvalidInput(
                "Appointment duration must be 30 or 60 minutes".to_string(),
            ));
        }

        let time_of_day = time::parse_hhmm(&request.time).ok_or_else(|| {
            AppointmentError::InvalidInput(format!("Invalid time: {}", request.time))
        })?;

        let appointment_type = parse_appointment_type(request.appointment_type.as_deref())?;

        let doctor = self.doctor_service.get_doctor(request.doctor_id).await?;

        let start_time = time::combine(request.date, time_of_day);
        let end_time = time::add_minutes(start_time, duration_minutes as i64);

        let _guard = self.locks.acquire(doctor.id).await;

        validate_schedule(&doctor, start_time)?;

        let conflicts = self
            .conflict_service
            .find_overlapping(doctor.id, start_time, end_time, None)
            .await?;
        if !conflicts.is_empty() {
            warn!(
                "Booking conflict for doctor {} at {}: {} existing booking(s)",
                doctor.id,
                start_time,
                conflicts.len()
            );
            return Err(AppointmentError::SlotConflict);
        }

        let now = Utc::now();
        let appointment_data = json!({
            "doctor_id": doctor.id,
            "start_time": start_time.to_rfc3339(),
            "duration_minutes": duration_minutes,
            "appointment_type": appointment_type,
            "patient_name": patient_name,
            "notes": request.notes,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::POST,
                "/appointments",
                Some(appointment_data),
                Some(headers),
            )
            .await
            .map_err(|e| AppointmentError::StoreFailure(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::StoreFailure(
                "Store returned no row for created appointment".to_string(),
            ));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone()).map_err(|e| {
            AppointmentError::StoreFailure(format!("Failed to parse created appointment: {}", e))
        })?;

        info!(
            "Appointment {} booked with doctor {} at {}",
            appointment.id, doctor.id, appointment.start_time
        );

        Ok(appointment)
    }

    /// Apply a partial update. Supplying any of date, time, or duration makes
    /// this a reschedule: the merged candidate re-enters full validation with
    /// the appointment itself excluded from the conflict scan, so moving an
    /// appointment onto its own current slot succeeds.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;

        if let Some(name) = &request.patient_name {
            if name.trim().is_empty() {
                return Err(AppointmentError::InvalidInput(
                    "Patient name must not be empty".to_string(),
                ));
            }
        }

        let duration_minutes = request.duration_minutes.unwrap_or(current.duration_minutes);
        if !ALLOWED_DURATIONS_MINUTES.contains(&duration_minutes) {
            return Err(AppointmentError::InvalidInput(
                "Appointment duration must be 30 or 60 minutes".to_string(),
            ));
        }

        let new_time = match request.time.as_deref() {
            Some(text) => Some(time::parse_hhmm(text).ok_or_else(|| {
                AppointmentError::InvalidInput(format!("Invalid time: {}", text))
            })?),
            None => None,
        };

        let appointment_type = parse_appointment_type(request.appointment_type.as_deref())?;

        // Merge the proposed schedule over the current one: a new time keeps
        // the old date, a new date keeps the old time of day.
        let start_time = time::combine(
            request.date.unwrap_or_else(|| current.start_time.date_naive()),
            new_time.unwrap_or_else(|| current.start_time.time()),
        );
        let end_time = time::add_minutes(start_time, duration_minutes as i64);

        let reschedule = request.requires_revalidation();

        let _guard = if reschedule {
            Some(self.locks.acquire(current.doctor_id).await)
        } else {
            None
        };

        if reschedule {
            let doctor = self.doctor_service.get_doctor(current.doctor_id).await?;
            validate_schedule(&doctor, start_time)?;

            let conflicts = self
                .conflict_service
                .find_overlapping(
                    current.doctor_id,
                    start_time,
                    end_time,
                    Some(appointment_id),
                )
                .await?;
            if !conflicts.is_empty() {
                warn!(
                    "Reschedule conflict for appointment {} at {}: {} existing booking(s)",
                    appointment_id,
                    start_time,
                    conflicts.len()
                );
                return Err(AppointmentError::SlotConflict);
            }
        }

        let mut update_data = Map::new();

        if reschedule {
            update_data.insert("start_time".to_string(), json!(start_time.to_rfc3339()));
            update_data.insert("duration_minutes".to_string(), json!(duration_minutes));
        }
        if let Some(appointment_type) = appointment_type {
            update_data.insert("appointment_type".to_string(), json!(appointment_type));
        }
        if let Some(patient_name) = &request.patient_name {
            update_data.insert("patient_name".to_string(), json!(patient_name.trim()));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await
            .map_err(|e| AppointmentError::StoreFailure(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let updated: Appointment = serde_json::from_value(result[0].clone()).map_err(|e| {
            AppointmentError::StoreFailure(format!("Failed to parse updated appointment: {}", e))
        })?;

        info!("Appointment {} updated", appointment_id);
        Ok(updated)
    }

    /// Remove an appointment outright, freeing its interval.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let path = format!("/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        // The returned rows tell a delete apart from a miss in one round-trip.
        let result: Vec<Value> = self
            .store
            .request_with_headers(Method::DELETE, &path, None, Some(headers))
            .await
            .map_err(|e| AppointmentError::StoreFailure(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    /// Fetch one appointment by id.
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::StoreFailure(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        serde_json::from_value(result[0].clone()).map_err(|e| {
            AppointmentError::StoreFailure(format!("Failed to parse appointment: {}", e))
        })
    }

    /// Every appointment, earliest first.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments");

        self.fetch_appointments("/appointments?order=start_time.asc")
            .await
    }

    /// Appointments whose start falls on the given calendar day.
    pub async fn list_appointments_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments on {}", date);

        let day_start = time::combine(date, NaiveTime::MIN);
        let day_end = time::add_minutes(day_start, 24 * 60);

        let path = format!(
            "/appointments?start_time=gte.{}&start_time=lt.{}&order=start_time.asc",
            urlencoding::encode(&day_start.to_rfc3339()),
            urlencoding::encode(&day_end.to_rfc3339()),
        );

        self.fetch_appointments(&path).await
    }

    pub async fn get_appointment_with_doctor(
        &self,
        appointment_id: Uuid,
    ) -> Result<AppointmentWithDoctor, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        let doctor = self.resolve_doctor_summary(appointment.doctor_id).await?;

        Ok(AppointmentWithDoctor {
            appointment,
            doctor,
        })
    }

    /// Resolve each appointment's doctor to its registry summary. A doctor id
    /// that no longer resolves renders as `doctor: null` instead of failing
    /// the whole read.
    pub async fn with_doctor_summaries(
        &self,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentWithDoctor>, AppointmentError> {
        let mut summaries: HashMap<Uuid, Option<DoctorSummary>> = HashMap::new();
        let mut enriched = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            let doctor = match summaries.get(&appointment.doctor_id) {
                Some(known) => known.clone(),
                None => {
                    let resolved = self.resolve_doctor_summary(appointment.doctor_id).await?;
                    summaries.insert(appointment.doctor_id, resolved.clone());
                    resolved
                }
            };
            enriched.push(AppointmentWithDoctor {
                appointment,
                doctor,
            });
        }

        Ok(enriched)
    }

    async fn resolve_doctor_summary(
        &self,
        doctor_id: Uuid,
    ) -> Result<Option<DoctorSummary>, AppointmentError> {
        match self.doctor_service.get_doctor(doctor_id).await {
            Ok(doctor) => Ok(Some(DoctorSummary::from(&doctor))),
            Err(DoctorError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_appointments(&self, path: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::StoreFailure(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    AppointmentError::StoreFailure(format!("Failed to parse appointment: {}", e))
                })
            })
            .collect()
    }
}

/// Past and working-hours rules. The start's time of day must fall inside the
/// doctor's [start, end) window.
fn validate_schedule(doctor: &Doctor, start_time: DateTime<Utc>) -> Result<(), AppointmentError> {
    if start_time < Utc::now() {
        return Err(AppointmentError::PastAppointment);
    }

    let time_of_day = start_time.time();
    if time_of_day < doctor.working_hours.start || time_of_day >= doctor.working_hours.end {
        return Err(AppointmentError::OutsideWorkingHours {
            start: doctor.working_hours.start,
            end: doctor.working_hours.end,
        });
    }

    Ok(())
}

fn parse_appointment_type(
    label: Option<&str>,
) -> Result<Option<AppointmentType>, AppointmentError> {
    match label {
        None => Ok(None),
        Some(label) => AppointmentType::from_label(label).map(Some).ok_or_else(|| {
            AppointmentError::InvalidInput(format!("Unknown appointment type: {}", label))
        }),
    }
}
