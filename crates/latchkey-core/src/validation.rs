//! Input validation for identifiers, usernames and passwords.
//!
//! Every failure is reported as [`LatchkeyError::BadRequest`] naming the
//! offending field.

use uuid::Uuid;

use crate::error::{LatchkeyError, LatchkeyResult};

/// A single validation rule applied to a string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must not be empty.
    Required,
    /// Value must not contain whitespace.
    NoSpaces,
    /// Value must contain at least `n` characters.
    MinLength(usize),
    /// Value must parse as a UUID.
    Uuid,
    /// Value must contain at least one letter and one digit.
    LettersAndDigits,
}

impl Rule {
    fn check(self, field: &str, value: &str) -> LatchkeyResult<()> {
        let ok = match self {
            Rule::Required => !value.is_empty(),
            Rule::NoSpaces => !value.chars().any(char::is_whitespace),
            Rule::MinLength(n) => value.chars().count() >= n,
            Rule::Uuid => Uuid::parse_str(value).is_ok(),
            Rule::LettersAndDigits => {
                value.chars().any(|c| c.is_alphabetic()) && value.chars().any(|c| c.is_ascii_digit())
            }
        };
        if ok {
            return Ok(());
        }

        let message = match self {
            Rule::Required => format!("{field} is required"),
            Rule::NoSpaces => format!("{field} must not contain spaces"),
            Rule::MinLength(n) => format!("{field} must be at least {n} characters long"),
            Rule::Uuid => format!("{field} must be a valid UUID"),
            Rule::LettersAndDigits => format!("{field} must contain letters and digits"),
        };
        Err(LatchkeyError::bad_request(message))
    }
}

/// The current/new pair submitted when rotating a password.
#[derive(Debug, Clone, Default)]
pub struct Passwords {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone)]
pub struct Validator {
    min_password_length: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            min_password_length: 8,
        }
    }
}

impl Validator {
    pub fn new(min_password_length: usize) -> Self {
        Self {
            min_password_length,
        }
    }

    /// Check that `value` is present.
    pub fn validate(&self, field: &str, value: &str) -> LatchkeyResult<()> {
        Rule::Required.check(field, value)
    }

    /// Check `value` against every rule in order, stopping at the first
    /// violation.
    pub fn validate_with_rules(&self, field: &str, value: &str, rules: &[Rule]) -> LatchkeyResult<()> {
        rules.iter().try_for_each(|rule| rule.check(field, value))
    }

    pub fn validate_id(&self, field: &str, value: &str) -> LatchkeyResult<Uuid> {
        self.validate_with_rules(field, value, &[Rule::Required, Rule::Uuid])?;
        Uuid::parse_str(value).map_err(|e| LatchkeyError::bad_request(format!("{field}: {e}")))
    }

    pub fn validate_username(&self, username: &str) -> LatchkeyResult<()> {
        self.validate_with_rules("username", username, &[Rule::Required, Rule::NoSpaces])
    }

    pub fn validate_password(&self, field: &str, password: &str) -> LatchkeyResult<()> {
        self.validate_with_rules(field, password, &self.password_rules())
    }

    pub fn validate_passwords(&self, passwords: &Passwords) -> LatchkeyResult<()> {
        self.validate_password("current_password", &passwords.current_password)?;
        self.validate_password("new_password", &passwords.new_password)
    }

    fn password_rules(&self) -> [Rule; 4] {
        [
            Rule::Required,
            Rule::NoSpaces,
            Rule::MinLength(self.min_password_length),
            Rule::LettersAndDigits,
        ]
    }
}
