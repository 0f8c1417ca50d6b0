//! Seeds the doctors collection with the clinic's sample registry.
//!
//! Clears whatever is there first, so running it twice does not duplicate
//! records. Usage: `cargo run --bin seed` with DATA_API_URL/DATA_API_KEY set.

use anyhow::Result;
use dotenv::dotenv;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doctor_cell::models::{CreateDoctorRequest, WorkingHoursRequest};
use doctor_cell::services::DoctorService;
use shared_config::AppConfig;
use shared_database::store::StoreClient;

fn sample_doctors() -> Vec<CreateDoctorRequest> {
    vec![
        CreateDoctorRequest {
            name: "Dr. Sarah Smith".to_string(),
            specialization: Some("Pediatrician".to_string()),
            working_hours: Some(WorkingHoursRequest {
                start: "09:00".to_string(),
                end: "17:00".to_string(),
            }),
        },
        CreateDoctorRequest {
            name: "Dr. John Kumar".to_string(),
            specialization: Some("Dentist".to_string()),
            working_hours: Some(WorkingHoursRequest {
                start: "10:00".to_string(),
                end: "18:00".to_string(),
            }),
        },
        CreateDoctorRequest {
            name: "Dr. Priya Patel".to_string(),
            specialization: Some("Cardiologist".to_string()),
            working_hours: Some(WorkingHoursRequest {
                start: "08:00".to_string(),
                end: "16:00".to_string(),
            }),
        },
        CreateDoctorRequest {
            name: "Dr. Michael Chen".to_string(),
            specialization: Some("General Physician".to_string()),
            working_hours: Some(WorkingHoursRequest {
                start: "09:00".to_string(),
                end: "17:30".to_string(),
            }),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let store = StoreClient::new(&config);

    // Clear existing doctors. The store needs a filter on delete, and asking
    // for the removed rows back tells us how many went.
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    let removed: Vec<Value> = store
        .request_with_headers(
            Method::DELETE,
            "/doctors?id=not.is.null",
            None,
            Some(headers),
        )
        .await?;
    info!("Cleared {} existing doctors", removed.len());

    let service = DoctorService::new(&config);
    for request in sample_doctors() {
        let doctor = service.create_doctor(request).await?;
        info!(
            "Added {} ({}), hours {}-{}",
            doctor.name,
            doctor.specialization,
            doctor.working_hours.start.format("%H:%M"),
            doctor.working_hours.end.format("%H:%M")
        );
    }

    info!("Seeding complete");
    Ok(())
}
