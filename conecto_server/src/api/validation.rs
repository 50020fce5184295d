//! Request validation utilities for the Conecto API.

use crate::api::errors::ValidationError;
use serde_json::Value;

/// Minimum length a handle must have to be claimable.
pub const MIN_HANDLE_LENGTH: usize = 2;

/// Validate EVM-style address format
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.is_empty() {
        return Err(ValidationError {
            field: "address".to_string(),
            message: "Address cannot be empty".to_string(),
            value: Some(Value::String(address.to_string())),
        });
    }

    if !address.starts_with("0x") {
        return Err(ValidationError {
            field: "address".to_string(),
            message: "Address must start with '0x'".to_string(),
            value: Some(Value::String(address.to_string())),
        });
    }

    if address.len() != 42 {
        return Err(ValidationError {
            field: "address".to_string(),
            message: "Address must be 42 characters long (including '0x')".to_string(),
            value: Some(Value::String(address.to_string())),
        });
    }

    if !is_valid_hex(&address[2..]) {
        return Err(ValidationError {
            field: "address".to_string(),
            message: "Address contains invalid hex characters".to_string(),
            value: Some(Value::String(address.to_string())),
        });
    }

    Ok(())
}

/// Validate a creator handle: lowercase slug of at least two characters.
pub fn validate_handle(handle: &str) -> Result<(), ValidationError> {
    if handle.len() < MIN_HANDLE_LENGTH {
        return Err(ValidationError {
            field: "handle".to_string(),
            message: format!("Handle must be at least {} characters", MIN_HANDLE_LENGTH),
            value: Some(Value::String(handle.to_string())),
        });
    }

    if !handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError {
            field: "handle".to_string(),
            message: "Handle may only contain lowercase letters, digits and '-'".to_string(),
            value: Some(Value::String(handle.to_string())),
        });
    }

    Ok(())
}

/// Validate a tier price: finite and non-negative.
pub fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError {
            field: "price".to_string(),
            message: "Price must be a non-negative number".to_string(),
            value: serde_json::to_value(price).ok(),
        });
    }

    Ok(())
}

/// Check if string is valid hex
fn is_valid_hex(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_hexdigit())
}
