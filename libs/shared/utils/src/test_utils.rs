use std::sync::Arc;

use serde_json::json;

use shared_config::AppConfig;

pub struct TestConfig {
    pub data_api_url: String,
    pub data_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            data_api_url: "http://localhost:3001".to_string(),
            data_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing at a wiremock server standing in for the store.
    pub fn for_store(store_url: &str) -> Self {
        Self {
            data_api_url: store_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            data_api_url: self.data_api_url.clone(),
            data_api_key: self.data_api_key.clone(),
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn doctor_response(
        doctor_id: &str,
        name: &str,
        specialization: &str,
        start: &str,
        end: &str,
    ) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "name": name,
            "specialization": specialization,
            "working_hours": {
                "start": start,
                "end": end
            },
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        appointment_id: &str,
        doctor_id: &str,
        start_time: &str,
        duration_minutes: i32,
        patient_name: &str,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "doctor_id": doctor_id,
            "start_time": start_time,
            "duration_minutes": duration_minutes,
            "appointment_type": "Consultation",
            "patient_name": patient_name,
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message
            }
        })
    }
}
