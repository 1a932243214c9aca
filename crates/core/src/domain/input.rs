use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Severity of an input validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Information,
}

/// Message produced by an input box validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputValidation {
    pub message: String,
    pub severity: ValidationSeverity,
}

impl InputValidation {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == ValidationSeverity::Error
    }
}

/// Validation hook run against the input box value
pub type InputValidator = Arc<dyn Fn(&str) -> Option<InputValidation> + Send + Sync>;

/// Validator warning when the subject line (first line) exceeds `max` characters
pub fn subject_length_validator(max: usize) -> InputValidator {
    Arc::new(move |value: &str| {
        let subject = value.lines().next().unwrap_or("");
        let length = subject.chars().count();
        if length > max {
            Some(InputValidation::warning(format!(
                "{} characters over {} in current line",
                length - max,
                max
            )))
        } else {
            None
        }
    })
}

/// Commit-message field shared by one provider
#[derive(Clone)]
pub struct InputBox {
    value: String,
    placeholder: String,
    enabled: bool,
    visible: bool,
    validator: Option<InputValidator>,
}

impl Default for InputBox {
    fn default() -> Self {
        Self {
            value: String::new(),
            placeholder: String::new(),
            enabled: true,
            visible: true,
            validator: None,
        }
    }
}

impl InputBox {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Run the validator against the current value
    pub fn validate(&self) -> Option<InputValidation> {
        self.validate_value(&self.value)
    }

    /// Run the validator against an arbitrary value
    pub fn validate_value(&self, value: &str) -> Option<InputValidation> {
        self.validator.as_ref().and_then(|validate| validate(value))
    }

    pub(crate) fn set_value(&mut self, value: String) {
        self.value = value;
    }

    pub(crate) fn clear(&mut self) {
        self.value.clear();
    }

    pub(crate) fn set_placeholder(&mut self, placeholder: String) {
        self.placeholder = placeholder;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_validator(&mut self, validator: Option<InputValidator>) {
        self.validator = validator;
    }
}

impl std::fmt::Debug for InputBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBox")
            .field("value", &self.value)
            .field("placeholder", &self.placeholder)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
