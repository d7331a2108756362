//! Store connectivity check.

use serde::Serialize;
use tabled::Tabled;

use hrm_core::config::AppConfig;
use hrm_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Health report row
#[derive(Debug, Serialize, Tabled)]
struct HealthRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Healthy")]
    healthy: bool,
}

/// Execute the health check
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let store = super::connect_store(config).await?;
    let healthy = store.health_check().await?;

    output::print_item(
        &HealthRow {
            provider: config.store.provider.clone(),
            healthy,
        },
        format,
    );

    if healthy {
        Ok(())
    } else {
        Err(AppError::store("Store did not answer the health check"))
    }
}
