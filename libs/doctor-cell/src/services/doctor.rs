use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_utils::time;

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorError, WorkingHours, DEFAULT_SPECIALIZATION,
};

pub struct DoctorService {
    store: StoreClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Create a new doctor record, applying the registry defaults for
    /// specialization and working hours.
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DoctorError::InvalidInput(
                "Doctor name must not be empty".to_string(),
            ));
        }

        let working_hours = match request.working_hours {
            Some(window) => {
                let start = time::parse_hhmm(&window.start).ok_or_else(|| {
                    DoctorError::InvalidInput(format!("Invalid working hours start: {}", window.start))
                })?;
                let end = time::parse_hhmm(&window.end).ok_or_else(|| {
                    DoctorError::InvalidInput(format!("Invalid working hours end: {}", window.end))
                })?;
                WorkingHours { start, end }
            }
            None => WorkingHours::default(),
        };

        if working_hours.start >= working_hours.end {
            return Err(DoctorError::InvalidInput(
                "Working hours start must be before end".to_string(),
            ));
        }

        debug!("Creating doctor record for: {}", name);

        let now = Utc::now();
        let doctor_data = json!({
            "name": name,
            "specialization": request
                .specialization
                .unwrap_or_else(|| DEFAULT_SPECIALIZATION.to_string()),
            "working_hours": working_hours,
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
            .request_with_headers(Method::POST, "/doctors", Some(doctor_data), Some(headers))
            .await
            .map_err(|e| DoctorError::StoreFailure(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::StoreFailure(
                "Store returned no row for created doctor".to_string(),
            ));
        }

        let doctor: Doctor = serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::StoreFailure(format!("Failed to parse created doctor: {}", e)))?;

        info!("Doctor record created: {} ({})", doctor.name, doctor.id);

        Ok(doctor)
    }

    /// Fetch one doctor by id.
    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::StoreFailure(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::StoreFailure(format!("Failed to parse doctor: {}", e)))
    }

    /// Every doctor in the registry.
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors");

        let result: Vec<Value> = self
            .store
            .request(Method::GET, "/doctors", None)
            .await
            .map_err(|e| DoctorError::StoreFailure(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| DoctorError::StoreFailure(format!("Failed to parse doctor: {}", e)))
            })
            .collect()
    }
}
