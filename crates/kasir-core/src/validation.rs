//! # Validation Module
//!
//! Field-level rules shared by every input DTO in [`crate::input`].
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser client                                               │
//! │  └── Form hints, immediate feedback                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: RPC handler                                                  │
//! │  ├── Shape and enum checks (serde deserialization)                     │
//! │  └── THIS MODULE: length, sign and format rules                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_quantity >= 0), CHECK (balance_cents >= 0)           │
//! │  ├── UNIQUE (username), UNIQUE (transaction_number)                    │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::validation::{validate_username, validate_quantity};
//!
//! assert!(validate_username("budi").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn min_chars(field: &str, value: &str, min: usize) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    if value.chars().count() < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    Ok(())
}

fn max_chars(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// User Fields
// =============================================================================

/// Usernames are 3 to 50 characters, no whitespace.
///
/// ```rust
/// use kasir_core::validation::validate_username;
///
/// assert!(validate_username("kasir01").is_ok());
/// assert!(validate_username("ab").is_err());
/// assert!(validate_username("two words").is_err());
/// ```
pub fn validate_username(username: &str) -> ValidationResult<()> {
    min_chars("username", username, 3)?;
    max_chars("username", username, 50)?;

    if username.trim().chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(())
}

/// Full names are 2 to 100 characters.
pub fn validate_full_name(full_name: &str) -> ValidationResult<()> {
    min_chars("full_name", full_name, 2)?;
    max_chars("full_name", full_name, 100)
}

/// Passwords need at least 6 characters. Not trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }
    Ok(())
}

// =============================================================================
// Product Fields
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    min_chars("name", name, 1)?;
    max_chars("name", name, 200)
}

/// Validates an optional free-text field (sku, barcode, category, notes).
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) => max_chars(field, v, max),
        None => Ok(()),
    }
}

/// Validates a search query and returns it trimmed.
///
/// An empty query is allowed and means "everything".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    max_chars("query", query, 100)?;
    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Quantities on cart lines and in/out movements must be at least 1.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }
    Ok(())
}

/// Strictly positive amount in cents (selling price, cart unit price, drawer amount).
pub fn validate_positive_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::must_be_positive(field));
    }
    Ok(())
}

/// Zero or more cents (cost price, balance).
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::must_not_be_negative(field));
    }
    Ok(())
}

/// Zero or more units (stock quantity, low-stock threshold).
pub fn validate_non_negative_count(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::must_not_be_negative(field));
    }
    Ok(())
}

// =============================================================================
// Ledger Fields
// =============================================================================

/// Cash drawer descriptions must say something, up to 255 characters.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    min_chars("description", description, 1)?;
    max_chars("description", description, 255)
}

// =============================================================================
// Dates
// =============================================================================

/// Parses a `YYYY-MM-DD` calendar date.
///
/// ```rust
/// use kasir_core::validation::parse_date;
///
/// assert!(parse_date("start_date", "2024-01-31").is_ok());
/// assert!(parse_date("start_date", "2024-02-30").is_err());
/// assert!(parse_date("start_date", "31/01/2024").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
