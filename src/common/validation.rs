// src/common/validation.rs

use validator::ValidationError;

use crate::common::masks::{is_valid_phone, BRAZILIAN_STATES};

// Campos vazios ficam a cargo do `length(min = 1)`; aqui só validamos conteúdo.

pub fn validate_state(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || BRAZILIAN_STATES.contains(&value) {
        return Ok(());
    }
    Err(ValidationError::new("invalid_state"))
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || is_valid_phone(value) {
        return Ok(());
    }
    Err(ValidationError::new("invalid_phone"))
}

/// Rejeita valores que são apenas espaços.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_must_be_a_brazilian_state() {
        assert!(validate_state("São Paulo").is_ok());
        assert!(validate_state("").is_ok());
        assert_eq!(validate_state("Texas").unwrap_err().code, "invalid_state");
    }

    #[test]
    fn blank_values_are_required() {
        assert!(validate_not_blank("horario").is_ok());
        assert_eq!(validate_not_blank("   ").unwrap_err().code, "required");
    }
}
