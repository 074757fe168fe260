use thiserror::Error;
use url::Url;

/// Longest accepted website name, in characters
pub const MAX_NAME_LENGTH: usize = 50;

/// A request rejected before any check was attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Validation results with specific error messages
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { is_valid: true, error: None }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self { is_valid: false, error: Some(msg.into()) }
    }

    pub fn to_result(&self) -> Result<(), ValidationError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ValidationError(self.error.clone().unwrap_or_else(|| "Validation failed".to_string())))
        }
    }

    /// First failure wins
    pub fn and(self, next: impl FnOnce() -> ValidationResult) -> Self {
        if self.is_valid { next() } else { self }
    }
}

/// Validate the target of a check: present, and a well-formed absolute URL.
///
/// The URL check comes first, so an empty string is reported as invalid.
/// Schemes the checker cannot fetch are accepted here and surface as offline results.
pub fn validate_check_url(target: Option<&str>) -> ValidationResult {
    let Some(target) = target else {
        return ValidationResult::err("URL is required");
    };

    if Url::parse(target).is_err() {
        return ValidationResult::err("Please enter a valid URL");
    }

    ValidationResult::ok()
}

/// Validate a website display name: present and at most 50 characters
pub fn validate_website_name(name: Option<&str>) -> ValidationResult {
    match name {
        None | Some("") => ValidationResult::err("Name is required"),
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => ValidationResult::err("Name too long"),
        Some(_) => ValidationResult::ok(),
    }
}

/// Validate a website registration; the URL is checked before the name
pub fn validate_new_website(url: Option<&str>, name: Option<&str>) -> ValidationResult {
    validate_check_url(url).and(|| validate_website_name(name))
}
