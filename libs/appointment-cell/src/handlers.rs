// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AppointmentError, BookAppointmentRequest, UpdateAppointmentRequest};
use crate::services::booking::BookingService;
use crate::services::locks::DoctorScheduleLocks;

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(locks): Extension<Arc<DoctorScheduleLocks>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state, locks);

    let appointment = booking_service
        .book_appointment(request)
        .await
        .map_err(|e| match e {
            AppointmentError::DoctorNotFound => AppError::NotFound(e.to_string()),
            AppointmentError::SlotConflict => AppError::Conflict(e.to_string()),
            AppointmentError::PastAppointment
            | AppointmentError::OutsideWorkingHours { .. }
            | AppointmentError::InvalidInput(_) => AppError::BadRequest(e.to_string()),
            _ => AppError::Internal("Internal service error".to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(locks): Extension<Arc<DoctorScheduleLocks>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state, locks);

    let appointment = booking_service
        .update_appointment(appointment_id, request)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound | AppointmentError::DoctorNotFound => {
                AppError::NotFound(e.to_string())
            }
            AppointmentError::SlotConflict => AppError::Conflict(e.to_string()),
            AppointmentError::PastAppointment
            | AppointmentError::OutsideWorkingHours { .. }
            | AppointmentError::InvalidInput(_) => AppError::BadRequest(e.to_string()),
            _ => AppError::Internal("Internal service error".to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(locks): Extension<Arc<DoctorScheduleLocks>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state, locks);

    booking_service
        .cancel_appointment(appointment_id)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound(e.to_string()),
            _ => AppError::Internal("Internal service error".to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(locks): Extension<Arc<DoctorScheduleLocks>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state, locks);

    let appointment = booking_service
        .get_appointment_with_doctor(appointment_id)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound(e.to_string()),
            _ => AppError::Internal("Internal service error".to_string()),
        })?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(locks): Extension<Arc<DoctorScheduleLocks>>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state, locks);

    let appointments = booking_service
        .list_appointments()
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound(e.to_string()),
            _ => AppError::Internal("Internal service error".to_string()),
        })?;

    let enriched = booking_service
        .with_doctor_summaries(appointments)
        .await
        .map_err(|_| AppError::Internal("Internal service error".to_string()))?;

    Ok(Json(json!(enriched)))
}

#[axum::debug_handler]
pub async fn list_appointments_on_date(
    State(state): State<Arc<AppConfig>>,
    Extension(locks): Extension<Arc<DoctorScheduleLocks>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state, locks);

    let appointments = booking_service
        .list_appointments_on_date(date)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound => AppError::NotFound(e.to_string()),
            _ => AppError::Internal("Internal service error".to_string()),
        })?;

    let enriched = booking_service
        .with_doctor_summaries(appointments)
        .await
        .map_err(|_| AppError::Internal("Internal service error".to_string()))?;

    Ok(Json(json!(enriched)))
}
