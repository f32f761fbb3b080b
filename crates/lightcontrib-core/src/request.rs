//! Typed parameter requests
//!
//! The core never prompts. It describes the value it needs as a
//! [`ParamRequest`]; the UI collects a response and hands it back through
//! [`ParamRequest::parse`], which only lets validated values through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures for a parameter response
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: expected a number, got '{input}'")]
    NotANumber { field: String, input: String },

    #[error("{field}: value must be finite")]
    NotFinite { field: String },

    #[error("{field}: value must be at least {min}")]
    BelowMinimum { field: String, min: f64 },

    #[error("{field}: value must not be empty")]
    Empty { field: String },

    #[error("{field}: '{input}' is not a valid node name")]
    InvalidName { field: String, input: String },
}

/// Type of value a request expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Float,
    Text,
}

/// Rule a response must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Validation {
    /// Anything of the right type
    Any,
    /// Finite number no smaller than the bound
    AtLeast(f64),
    /// Non-empty text
    NonEmpty,
    /// Letters, digits and underscores, not starting with a digit
    NodeName,
}

/// A validated response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            Self::Float(_) => None,
        }
    }
}

/// A request for one value from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRequest {
    /// Field being edited
    pub field: String,
    /// Text shown to the user
    pub prompt: String,
    pub expected: ValueType,
    pub rule: Validation,
}

impl ParamRequest {
    pub fn new(field: impl Into<String>, expected: ValueType, rule: Validation) -> Self {
        let field = field.into();
        Self {
            prompt: format!("Enter {} value to change:", field),
            field,
            expected,
            rule,
        }
    }

    /// Parse and validate a raw response
    pub fn parse(&self, input: &str) -> Result<ParamValue, ValidationError> {
        let input = input.trim();
        let value = match self.expected {
            ValueType::Float => {
                let v: f64 = input.parse().map_err(|_| ValidationError::NotANumber {
                    field: self.field.clone(),
                    input: input.to_string(),
                })?;
                if !v.is_finite() {
                    return Err(ValidationError::NotFinite {
                        field: self.field.clone(),
                    });
                }
                ParamValue::Float(v)
            }
            ValueType::Text => ParamValue::Text(input.to_string()),
        };
        self.check(&value, input)?;
        Ok(value)
    }

    fn check(&self, value: &ParamValue, input: &str) -> Result<(), ValidationError> {
        match (self.rule, value) {
            (Validation::Any, _) => Ok(()),
            (Validation::AtLeast(min), ParamValue::Float(v)) if *v < min => {
                Err(ValidationError::BelowMinimum {
                    field: self.field.clone(),
                    min,
                })
            }
            (Validation::NonEmpty | Validation::NodeName, _) if input.is_empty() => {
                Err(ValidationError::Empty {
                    field: self.field.clone(),
                })
            }
            (Validation::NodeName, _) if !is_node_name(input) => {
                Err(ValidationError::InvalidName {
                    field: self.field.clone(),
                    input: input.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn is_node_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_request() {
        let request = ParamRequest::new("intensity", ValueType::Float, Validation::AtLeast(0.0));

        assert_eq!(request.parse(" 2.5 ").unwrap(), ParamValue::Float(2.5));
        assert!(matches!(
            request.parse("bright"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            request.parse("-1"),
            Err(ValidationError::BelowMinimum { .. })
        ));
        assert!(matches!(
            request.parse("inf"),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_node_name_request() {
        let request = ParamRequest::new("rename", ValueType::Text, Validation::NodeName);

        assert_eq!(
            request.parse("key_light02").unwrap(),
            ParamValue::Text("key_light02".to_string())
        );
        assert!(matches!(request.parse(""), Err(ValidationError::Empty { .. })));
        assert!(matches!(
            request.parse("2key"),
            Err(ValidationError::InvalidName { .. })
        ));
        assert!(matches!(
            request.parse("key light"),
            Err(ValidationError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_prompt() {
        let request = ParamRequest::new("intensity", ValueType::Float, Validation::Any);
        assert_eq!(request.prompt, "Enter intensity value to change:");
    }
}
