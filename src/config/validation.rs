//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate version bounds and the version path prefix
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("versioning.min_api_version must be at least 1")]
    MinVersionZero,

    #[error("versioning.min_api_version ({min}) exceeds versioning.max_api_version ({max})")]
    VersionBoundsInverted { min: u32, max: u32 },

    #[error(
        "versioning.version_prefix {0:?} must start with '/', contain no other '/' and not be empty"
    )]
    InvalidPrefix(String),

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroTimeout,

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let versioning = &config.versioning;

    if versioning.min_api_version == 0 {
        errors.push(ValidationError::MinVersionZero);
    }
    if versioning.min_api_version > versioning.max_api_version {
        errors.push(ValidationError::VersionBoundsInverted {
            min: versioning.min_api_version,
            max: versioning.max_api_version,
        });
    }

    let prefix = &versioning.version_prefix;
    let prefix_ok = prefix.len() > 1 && prefix.starts_with('/') && !prefix[1..].contains('/');
    if !prefix_ok {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.versioning.min_api_version = 0;
        config.versioning.version_prefix = "v".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MinVersionZero));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
    }

    #[test]
    fn test_inverted_bounds() {
        let mut config = ServerConfig::default();
        config.versioning.min_api_version = 4;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::VersionBoundsInverted { min: 4, max: 3 }]
        );
    }

    #[test]
    fn test_prefix_rules() {
        for bad in ["", "/", "v", "/api/v", "/v/"] {
            let mut config = ServerConfig::default();
            config.versioning.version_prefix = bad.into();
            assert!(validate_config(&config).is_err(), "prefix {:?} accepted", bad);
        }
        let mut config = ServerConfig::default();
        config.versioning.version_prefix = "/version".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
