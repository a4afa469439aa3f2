//! CLI command implementations.

pub mod admin;
pub mod seed;

use bottleshop_storefront::backend::BackendClient;
use bottleshop_storefront::config::{BackendConfig, ConfigError};

/// Environment variable holding the service-role key.
pub const SERVICE_ROLE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Connect with the service-role key from the environment.
///
/// # Errors
///
/// Returns an error if the backend variables are missing or invalid.
pub fn connect() -> Result<(BackendConfig, BackendClient), ConfigError> {
    dotenvy::dotenv().ok();
    let config = BackendConfig::from_env(SERVICE_ROLE_KEY_VAR)?;
    let client = BackendClient::new(&config);
    Ok((config, client))
}
