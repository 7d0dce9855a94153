//! Service-account credentials.
//!
//! Loaded fresh for every request that needs them and dropped when the
//! request completes. Nothing here is cached or shared across requests.

use std::fs;

use terra_core::ServiceConfig;

use crate::error::{EoError, EoResult};

/// Non-interactive authentication material for the platform.
#[derive(Debug)]
pub struct ServiceAccountCredentials {
    email: String,
    key: String,
}

impl ServiceAccountCredentials {
    /// Read the key file named by the configuration.
    pub fn load(config: &ServiceConfig) -> EoResult<Self> {
        let key = fs::read_to_string(&config.service_account_key).map_err(|source| {
            EoError::Credentials {
                path: config.service_account_key.clone(),
                source,
            }
        })?;
        Ok(Self {
            email: config.service_account_email.clone(),
            key: key.trim_end().to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
