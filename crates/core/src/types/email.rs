//! Account email addresses.
//!
//! An email is the login key of a staff account. Two spellings of the same
//! mailbox (`Chef@Pizza.com`, ` chef@pizza.com `) must land on the same row,
//! so the stored form is trimmed and lowercased once, at parse time, and
//! every lookup goes through [`Email::parse`].

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string is not a usable account email.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    #[error("email needs something before the @")]
    EmptyLocalPart,
    #[error("email needs a domain after the @")]
    EmptyDomain,
}

/// Normalized account email: trimmed, lowercased, `local@domain`.
///
/// ```
/// use storekeep_core::Email;
///
/// let key = Email::parse(" Chef@Pizza.COM ").unwrap();
/// assert_eq!(key, Email::parse("chef@pizza.com").unwrap());
/// assert!(Email::parse("chef").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit, applied after trimming.
    pub const MAX_LENGTH: usize = 254;

    /// Normalize `input` into an account key.
    ///
    /// # Errors
    ///
    /// Rejects input that is blank once trimmed, longer than
    /// [`Email::MAX_LENGTH`], or missing either side of the `@`.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match trimmed.split_once('@') {
            None => Err(EmailError::MissingAtSymbol),
            Some(("", _)) => Err(EmailError::EmptyLocalPart),
            Some((_, "")) => Err(EmailError::EmptyDomain),
            Some(_) => Ok(Self(trimmed.to_lowercase())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_map_to_one_account() {
        let typed = [
            "owner@example.com",
            "Owner@Example.com",
            "  OWNER@EXAMPLE.COM\n",
            "\towner@example.COM ",
        ];
        let keys: Vec<Email> = typed.iter().map(|s| Email::parse(s).unwrap()).collect();

        assert!(keys.iter().all(|k| k.as_str() == "owner@example.com"));
    }

    #[test]
    fn test_distinct_mailboxes_stay_distinct() {
        assert_ne!(
            Email::parse("owner+shop@example.com").unwrap(),
            Email::parse("owner@example.com").unwrap()
        );
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse(" \t\n"), Err(EmailError::Empty));
    }

    #[test]
    fn test_length_counts_after_trimming() {
        let at_limit = format!("{}@example.com", "a".repeat(Email::MAX_LENGTH - 12));
        assert!(Email::parse(&format!("   {at_limit}   ")).is_ok());

        let over = format!("a{at_limit}");
        assert_eq!(
            Email::parse(&over),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_both_sides_of_the_at_are_required() {
        assert_eq!(Email::parse("chef"), Err(EmailError::MissingAtSymbol));
        assert_eq!(Email::parse("@pizza.com"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse(" chef@ "), Err(EmailError::EmptyDomain));
    }

    #[test]
    fn test_serializes_as_normalized_string() {
        let email = Email::parse("Chef@Pizza.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"chef@pizza.com\"");
        assert_eq!(email.to_string(), "chef@pizza.com");
    }
}
