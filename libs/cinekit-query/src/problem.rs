//! RFC 9457 Problem Details for user-visible query failures.
//!
//! Pure data model, no HTTP framework dependency: the serving layer turns
//! a [`Problem`] into a response body. Query failures carry a violation
//! entry naming the offending field and the violated constraint.

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{ConfigError, QueryError};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// RFC 9457 Problem Details payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use]
pub struct Problem {
    /// A URI reference identifying the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// Short human-readable summary of the problem type.
    pub title: String,
    /// HTTP status code, serialized as u16.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub status: StatusCode,
    /// Explanation specific to this occurrence.
    pub detail: String,
    /// Machine-readable application error code.
    pub code: String,
    /// Field-level violations for 4xx problems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationViolation>>,
}

/// One field-level violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    /// Dot-notation field path, e.g. `rating.kp`.
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            code: String::new(),
            errors: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_violation(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.get_or_insert_with(Vec::new).push(ValidationViolation {
            field: field.into(),
            message: message.into(),
        });
        self
    }
}

impl From<QueryError> for Problem {
    fn from(err: QueryError) -> Self {
        match &err {
            QueryError::UnknownField { field, .. } => {
                Problem::new(StatusCode::BAD_REQUEST, "Unknown Query Field", err.to_string())
                    .with_code("query.unknown_field")
                    .with_violation(field.as_str(), "field is not queryable for this entity")
            }
            QueryError::TypeMismatch { field, expected, .. } => {
                Problem::new(StatusCode::BAD_REQUEST, "Invalid Query Value", err.to_string())
                    .with_code("query.type_mismatch")
                    .with_violation(field.as_str(), format!("value must be a valid {expected}"))
            }
            QueryError::MalformedQueryString(_) => {
                Problem::new(StatusCode::BAD_REQUEST, "Malformed Query String", err.to_string())
                    .with_code("query.malformed")
            }
        }
    }
}

impl From<ConfigError> for Problem {
    fn from(err: ConfigError) -> Self {
        // Registry faults are never the client's doing.
        Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Service Misconfigured",
            err.to_string(),
        )
        .with_code("config.invalid")
    }
}
