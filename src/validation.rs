//! Client-side form checks
//!
//! Shape checks that run before anything is sent: the alert creation form
//! and the monitoring email field. Business rules (does the coin exist, is
//! the email subscribed already) stay on the server.

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::types::{AlertRuleDto, AlertType};

/// Form field a validation failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    AlertType,
    TargetValue,
    Email,
    MonitoringEmail,
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormField::AlertType => write!(f, "alertType"),
            FormField::TargetValue => write!(f, "targetValue"),
            FormField::Email => write!(f, "email"),
            FormField::MonitoringEmail => write!(f, "monitoringEmail"),
        }
    }
}

/// Inline validation failure shown next to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raw alert creation form input, as typed by the user
#[derive(Debug, Clone, PartialEq)]
pub struct AlertForm {
    pub alert_type: AlertType,
    pub target_value: String,
    pub email: String,
}

impl Default for AlertForm {
    fn default() -> Self {
        Self {
            alert_type: AlertType::PriceIncrease,
            target_value: String::new(),
            email: String::new(),
        }
    }
}

impl AlertForm {
    /// Validate every field and build the request body for `coin_symbol`.
    ///
    /// All failing fields are reported at once.
    pub fn validate(&self, coin_symbol: &str) -> Result<AlertRuleDto> {
        let mut errors = Vec::new();

        if !self.alert_type.is_offered() {
            errors.push(FieldError::new(
                FormField::AlertType,
                format!("{} alerts are not available yet", self.alert_type.label()),
            ));
        }

        let target_value = match parse_target_value(&self.target_value) {
            Ok(v) => Some(v),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if let Err(e) = check_email(&self.email, FormField::Email) {
            errors.push(e);
        }

        match target_value {
            Some(target_value) if errors.is_empty() => Ok(AlertRuleDto {
                coin_symbol: coin_symbol.to_string(),
                alert_type: self.alert_type,
                target_value,
                email: self.email.trim().to_string(),
            }),
            _ => Err(MonitorError::Validation(errors)),
        }
    }
}

/// Validate the email typed into the monitoring toggle
pub fn validate_monitoring_email(email: &str) -> Result<String> {
    check_email(email, FormField::MonitoringEmail)
        .map(|()| email.trim().to_string())
        .map_err(|e| MonitorError::Validation(vec![e]))
}

fn parse_target_value(raw: &str) -> std::result::Result<f64, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldError::new(FormField::TargetValue, "Target value is required"));
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| FieldError::new(FormField::TargetValue, "Target value must be a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(FieldError::new(
            FormField::TargetValue,
            "Target value must be greater than zero",
        ));
    }
    Ok(value)
}

fn check_email(raw: &str, field: FormField) -> std::result::Result<(), FieldError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(FieldError::new(field, "Email is required"));
    }
    if !is_valid_email(email) {
        return Err(FieldError::new(field, "Invalid email address"));
    }
    Ok(())
}

/// Loose address shape check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty() && !host.starts_with('.')
}
