use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Field must be present and, if a string, non-empty after trimming.
    Required,
    /// Field must look like an email address.
    Email,
    /// Field must be a string of at least this many characters.
    MinLen(usize),
}

/// One declarative field rule; routes list these in `const` tables.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

impl Rule {
    pub const fn required(field: &'static str, message: &'static str) -> Self {
        Self { field, check: Check::Required, message }
    }
    pub const fn email(field: &'static str, message: &'static str) -> Self {
        Self { field, check: Check::Email, message }
    }
    pub const fn min_len(field: &'static str, n: usize, message: &'static str) -> Self {
        Self { field, check: Check::MinLen(n), message }
    }

    fn passes(&self, body: &Value) -> bool {
        let value = &body[self.field];
        match self.check {
            Check::Required => match value {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                Value::Array(a) => !a.is_empty(),
                _ => true,
            },
            Check::Email => value.as_str().map(is_valid_email).unwrap_or(false),
            Check::MinLen(n) => value.as_str().map(|s| s.chars().count() >= n).unwrap_or(false),
        }
    }
}

/// Evaluate every rule against the body, collecting ALL failing messages so a
/// caller can fix everything in one round trip.
pub fn validate(body: &Value, rules: &[Rule]) -> Result<(), ApiError> {
    let failed: Vec<String> = rules
        .iter()
        .filter(|r| !r.passes(body))
        .map(|r| r.message.to_string())
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(failed))
    }
}

/// Validate, then deserialize into the route's typed request. A type mismatch
/// that survives the rules (e.g. a number where a string belongs) still comes
/// back as a 400, not a 500.
pub fn validated<T: DeserializeOwned>(body: Value, rules: &[Rule]) -> Result<T, ApiError> {
    validate(&body, rules)?;
    serde_json::from_value(body).map_err(|e| ApiError::Validation(vec![e.to_string()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REGISTER_RULES: &[Rule] = &[
        Rule::required("name", "Name is required"),
        Rule::required("email", "Email is required"),
        Rule::email("email", "Please enter a valid email"),
        Rule::min_len("password", 6, "Please add a password with 6 or more characters"),
    ];

    fn failing_messages(body: &Value) -> Vec<String> {
        match validate(body, REGISTER_RULES) {
            Ok(()) => vec![],
            Err(ApiError::Validation(msgs)) => msgs,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_body_reports_every_failing_rule() {
        let msgs = failing_messages(&json!({}));
        assert_eq!(
            msgs,
            vec![
                "Name is required",
                "Email is required",
                "Please enter a valid email",
                "Please add a password with 6 or more characters",
            ]
        );
    }

    #[test]
    fn valid_body_passes() {
        let body = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2!"
        });
        assert!(validate(&body, REGISTER_RULES).is_ok());
    }

    #[test]
    fn whitespace_only_string_fails_required() {
        let msgs = failing_messages(&json!({
            "name": "   ",
            "email": "ada@example.com",
            "password": "hunter2!"
        }));
        assert_eq!(msgs, vec!["Name is required"]);
    }

    #[test]
    fn min_len_boundary_is_inclusive() {
        let at = json!({ "name": "a", "email": "a@b.co", "password": "123456" });
        assert!(validate(&at, REGISTER_RULES).is_ok());
        let under = json!({ "name": "a", "email": "a@b.co", "password": "12345" });
        assert_eq!(
            failing_messages(&under),
            vec!["Please add a password with 6 or more characters"]
        );
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("dev@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn validated_maps_type_mismatch_to_validation_error() {
        #[derive(Debug, serde::Deserialize)]
        struct Req {
            #[allow(dead_code)]
            text: String,
        }
        const RULES: &[Rule] = &[Rule::required("text", "Text is required")];
        let err = validated::<Req>(json!({ "text": 42 }), RULES).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
