//! User domain model and field rules.
//!
//! # Responsibility
//! - Define the single persisted record type managed by the core.
//! - Own the field-level validation rules applied by the service layer.
//!
//! # Invariants
//! - `id` is `None` until storage assigns one and never changes afterwards.
//! - `created_at` is set once in `User::new` and never rewritten by updates.
//! - `validate()` is strict; storage accepts records that fail it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage-assigned identifier. Positive once persisted.
pub type UserId = i64;

/// Lowest accepted age, inclusive.
pub const MIN_AGE: i32 = 0;
/// Highest accepted age, inclusive.
pub const MAX_AGE: i32 = 120;

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Field or identifier rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// `name` is empty or whitespace only.
    EmptyName,
    /// `email` is absent, empty or whitespace only.
    EmptyEmail,
    /// `age` lies outside `[MIN_AGE, MAX_AGE]`.
    AgeOutOfRange(i32),
    /// Lookup/delete identifier is not positive.
    NonPositiveId(UserId),
    /// Update target has no identifier or a non-positive one.
    MissingUpdateId(Option<UserId>),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "User name cannot be empty"),
            Self::EmptyEmail => write!(f, "User email cannot be empty"),
            Self::AgeOutOfRange(_) => {
                write!(f, "Age must be between {MIN_AGE} and {MAX_AGE}")
            }
            Self::NonPositiveId(_) => write!(f, "ID must be positive"),
            Self::MissingUpdateId(_) => write!(f, "User ID must be positive for update"),
        }
    }
}

impl Error for UserValidationError {}

/// A user record as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
    pub email: Option<String>,
    pub age: Option<i32>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Creates an unsaved user stamped with the current time.
    pub fn new(name: impl Into<String>, email: Option<String>, age: Option<i32>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email,
            age,
            created_at: now_epoch_ms(),
        }
    }

    /// Checks the fields required for create and update.
    ///
    /// Does not look at `id`; see [`validate_update_id`].
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        match self.email.as_deref() {
            Some(email) if !email.trim().is_empty() => {}
            _ => return Err(UserValidationError::EmptyEmail),
        }
        if let Some(age) = self.age {
            if !is_valid_age(age) {
                return Err(UserValidationError::AgeOutOfRange(age));
            }
        }
        Ok(())
    }
}

/// Rejects identifiers that storage can never have assigned.
pub fn validate_id(id: UserId) -> Result<UserId, UserValidationError> {
    if id <= 0 {
        return Err(UserValidationError::NonPositiveId(id));
    }
    Ok(id)
}

/// Returns the identifier of an update target, or why it is unusable.
pub fn validate_update_id(id: Option<UserId>) -> Result<UserId, UserValidationError> {
    match id {
        Some(value) if value > 0 => Ok(value),
        other => Err(UserValidationError::MissingUpdateId(other)),
    }
}

/// Returns whether `age` lies in `[MIN_AGE, MAX_AGE]`.
pub fn is_valid_age(age: i32) -> bool {
    (MIN_AGE..=MAX_AGE).contains(&age)
}

/// Loose `local@domain.tld` shape check used by input layers.
///
/// Storage and service do not enforce this.
pub fn is_valid_email_shape(value: &str) -> bool {
    EMAIL_SHAPE_RE.is_match(value)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User::new("Alice", Some("alice@example.com".to_string()), Some(30))
    }

    #[test]
    fn new_user_has_no_id_and_a_timestamp() {
        let user = alice();
        assert!(user.id.is_none());
        assert!(user.created_at > 0);
    }

    #[test]
    fn validate_accepts_absent_age_and_bounds() {
        let mut user = alice();
        user.age = None;
        assert!(user.validate().is_ok());
        user.age = Some(MIN_AGE);
        assert!(user.validate().is_ok());
        user.age = Some(MAX_AGE);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name_before_email() {
        let user = User::new("   ", None, None);
        assert_eq!(user.validate(), Err(UserValidationError::EmptyName));
    }

    #[test]
    fn validate_rejects_missing_or_blank_email() {
        let mut user = alice();
        user.email = None;
        assert_eq!(user.validate(), Err(UserValidationError::EmptyEmail));
        user.email = Some(" ".to_string());
        assert_eq!(user.validate(), Err(UserValidationError::EmptyEmail));
    }

    #[test]
    fn age_out_of_range_message_names_the_range() {
        let mut user = alice();
        user.age = Some(-1);
        let err = user.validate().unwrap_err();
        assert_eq!(err, UserValidationError::AgeOutOfRange(-1));
        assert_eq!(err.to_string(), "Age must be between 0 and 120");
    }

    #[test]
    fn id_rules() {
        assert_eq!(validate_id(7), Ok(7));
        assert_eq!(validate_id(0), Err(UserValidationError::NonPositiveId(0)));
        assert_eq!(validate_update_id(Some(3)), Ok(3));
        assert_eq!(
            validate_update_id(None).unwrap_err().to_string(),
            "User ID must be positive for update"
        );
        assert!(validate_update_id(Some(-4)).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email_shape("user@example.com"));
        assert!(is_valid_email_shape("first.last+tag@sub.domain.org"));
        assert!(!is_valid_email_shape("bad-email"));
        assert!(!is_valid_email_shape("user@domain"));
        assert!(!is_valid_email_shape("user @domain.com"));
        assert!(!is_valid_email_shape(""));
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let mut user = alice();
        user.id = Some(1);
        user.created_at = 1_700_000_000_000;
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(json["id"], 1);
        assert!(json.get("created_at").is_none());
    }
}
