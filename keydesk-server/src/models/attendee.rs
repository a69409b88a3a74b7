//! Attendee name validation

use super::ValidationError;

/// Validated attendee name.
///
/// Names are free-form and non-unique; the only rule is that a registration
/// must carry one.
///
/// # Example
/// ```
/// use keydesk_server::models::AttendeeName;
///
/// assert!(AttendeeName::new("Attendee 17").is_ok());
/// assert!(AttendeeName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeName(String);

impl AttendeeName {
    /// Create a new attendee name, rejecting the empty string.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        Ok(Self(s.to_owned()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AttendeeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
