//! Client validation rules
//!
//! # Rules
//!
//! - Cédula, first name and last name are required
//! - Cédula is at most 20 characters and contains no whitespace
//! - Email, when present, must be a well-formed address
//! - Birth date, when present, must be in the past

use chrono::{NaiveDate, Utc};
use validator::ValidateEmail;

use crate::client::{ClientUpdate, NewClient};
use crate::error::ClientError;

const MAX_CEDULA_LEN: usize = 20;

/// Result of client validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Converts into a `Result`, joining the collected messages
    pub fn into_result(self) -> Result<(), ClientError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ClientError::validation_failed(self.errors))
        }
    }
}

/// Validator for client commands
pub struct ClientValidator;

impl ClientValidator {
    /// Validates registration data (expects normalized input)
    pub fn validate_new(data: &NewClient) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if data.cedula.is_empty() || data.first_name.is_empty() || data.last_name.is_empty() {
            result.add_error("cedula, first name and last name are required");
        }
        Self::check_cedula(&data.cedula, &mut result);
        Self::check_email(data.email.as_deref(), &mut result);
        Self::check_birth_date(data.birth_date, &mut result);

        result
    }

    /// Validates a partial update (expects normalized input)
    pub fn validate_update(update: &ClientUpdate) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if let Some(cedula) = &update.cedula {
            Self::check_cedula(cedula, &mut result);
        }
        if let Some(email) = &update.email {
            Self::check_email(email.as_deref(), &mut result);
        }
        if let Some(birth_date) = update.birth_date {
            Self::check_birth_date(birth_date, &mut result);
        }

        result
    }

    fn check_cedula(cedula: &str, result: &mut ValidationResult) {
        if cedula.chars().count() > MAX_CEDULA_LEN {
            result.add_error(format!("cedula must be at most {MAX_CEDULA_LEN} characters"));
        }
        if cedula.chars().any(char::is_whitespace) {
            result.add_error("cedula must not contain spaces");
        }
    }

    fn check_email(email: Option<&str>, result: &mut ValidationResult) {
        if let Some(email) = email {
            if !email.validate_email() {
                result.add_error(format!("invalid email address: {email}"));
            }
        }
    }

    fn check_birth_date(birth_date: Option<NaiveDate>, result: &mut ValidationResult) {
        if let Some(date) = birth_date {
            if date >= Utc::now().date_naive() {
                result.add_error("birth date must be in the past");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_client() {
        let data = NewClient {
            email: Some("ana@example.com".into()),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 2),
            ..NewClient::new("V-12345678", "Ana", "Pérez")
        };
        assert!(ClientValidator::validate_new(&data).is_valid);
    }

    #[test]
    fn test_missing_required_fields() {
        let data = NewClient::new("", "Ana", "");
        let result = ClientValidator::validate_new(&data);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_invalid_email() {
        let data = NewClient {
            email: Some("not-an-email".into()),
            ..NewClient::new("V-1", "Ana", "Pérez")
        };
        let result = ClientValidator::validate_new(&data);
        assert!(result.errors.iter().any(|e| e.contains("email")));
    }

    #[test]
    fn test_future_birth_date() {
        let update = ClientUpdate {
            birth_date: Some(NaiveDate::from_ymd_opt(2999, 1, 1)),
            ..Default::default()
        };
        assert!(!ClientValidator::validate_update(&update).is_valid);
    }

    #[test]
    fn test_cedula_with_spaces() {
        let data = NewClient::new("V 123", "Ana", "Pérez");
        assert!(matches!(
            ClientValidator::validate_new(&data).into_result(),
            Err(ClientError::Validation(_))
        ));
    }
}
