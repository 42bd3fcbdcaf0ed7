use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// The constraint a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// The field is missing or `null`.
    Required,
    /// The field is present but has the wrong JSON type.
    WrongType,
    /// The value is not one of the allowed choices.
    EnumMismatch,
    /// The value is not a syntactically valid email address.
    MalformedEmail,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "required"),
            Rule::WrongType => write!(f, "wrong-type"),
            Rule::EnumMismatch => write!(f, "enum-mismatch"),
            Rule::MalformedEmail => write!(f, "malformed-email"),
        }
    }
}

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

/// Every field that failed validation for one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("validation failed: {}", summarize(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.rule))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    pub fn single(field: &str, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.to_string(),
                rule,
                message: message.into(),
            }],
        }
    }

    /// Returns `true` if `field` failed with `rule`.
    pub fn has(&self, field: &str, rule: Rule) -> bool {
        self.errors.iter().any(|e| e.field == field && e.rule == rule)
    }
}

/// A closed set of string values, such as a service category.
pub trait Choice: Sized {
    const ALLOWED: &'static [&'static str];

    fn parse(value: &str) -> Option<Self>;
}

/// Reads typed fields out of a raw JSON object, collecting every failure
/// instead of stopping at the first one.
pub struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(raw: &'a Value) -> Self {
        match raw.as_object() {
            Some(object) => Self {
                object: Some(object),
                errors: Vec::new(),
            },
            None => Self {
                object: None,
                errors: vec![FieldError {
                    field: "body".to_string(),
                    rule: Rule::WrongType,
                    message: "expected a JSON object".to_string(),
                }],
            },
        }
    }

    /// The non-null value of `field`, if any.
    fn value(&self, field: &str) -> Option<&'a Value> {
        self.object
            .and_then(|object| object.get(field))
            .filter(|value| !value.is_null())
    }

    fn fail(&mut self, field: &str, rule: Rule, message: impl Into<String>) {
        // A non-object body has already been reported once.
        if self.object.is_none() {
            return;
        }
        self.errors.push(FieldError {
            field: field.to_string(),
            rule,
            message: message.into(),
        });
    }

    pub fn required_str(&mut self, field: &str) -> String {
        match self.value(field) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                self.fail(field, Rule::WrongType, "expected a string");
                String::new()
            }
            None => {
                self.fail(field, Rule::Required, "field required");
                String::new()
            }
        }
    }

    pub fn optional_str(&mut self, field: &str) -> Option<String> {
        match self.value(field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.fail(field, Rule::WrongType, "expected a string");
                None
            }
            None => None,
        }
    }

    /// An ordered list of strings; absent means empty.
    pub fn string_list(&mut self, field: &str) -> Vec<String> {
        match self.value(field) {
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(s) => out.push(s.to_string()),
                        None => {
                            self.fail(field, Rule::WrongType, "expected a list of strings");
                            return Vec::new();
                        }
                    }
                }
                out
            }
            Some(_) => {
                self.fail(field, Rule::WrongType, "expected a list of strings");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn required_email(&mut self, field: &str) -> String {
        let present = self.value(field).is_some_and(Value::is_string);
        let value = self.required_str(field);
        if present && !is_valid_email(&value) {
            self.fail(
                field,
                Rule::MalformedEmail,
                "value is not a valid email address",
            );
        }
        value
    }

    pub fn required_choice<T: Choice>(&mut self, field: &str) -> Option<T> {
        match self.value(field) {
            Some(Value::String(s)) => {
                let parsed = T::parse(s);
                if parsed.is_none() {
                    self.fail(
                        field,
                        Rule::EnumMismatch,
                        format!("expected one of: {}", T::ALLOWED.join(", ")),
                    );
                }
                parsed
            }
            Some(_) => {
                self.fail(field, Rule::WrongType, "expected a string");
                None
            }
            None => {
                self.fail(field, Rule::Required, "field required");
                None
            }
        }
    }

    /// A timestamp given as an ISO 8601 string or as Unix time. Naive
    /// values are taken as UTC. Absent yields `None`.
    pub fn timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        let value = self.value(field)?;
        let parsed = match value {
            Value::String(s) => parse_timestamp(s),
            Value::Number(n) => n.as_f64().and_then(from_epoch),
            _ => None,
        };
        if parsed.is_none() {
            self.fail(field, Rule::WrongType, "expected a datetime");
        }
        parsed
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Accepts `T` or space between date and time, a `Z` or numeric offset
/// (with or without a colon), no offset (UTC), a bare date (midnight UTC)
/// or a numeric Unix time.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let zulu = s
        .strip_suffix('Z')
        .or_else(|| s.strip_suffix('z'))
        .map(|head| format!("{head}+00:00"));
    let s = zulu.as_deref().unwrap_or(s);

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    s.parse::<f64>().ok().and_then(from_epoch)
}

/// Unix time in seconds, or in milliseconds once the magnitude passes 2e10.
fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() > 2e10 { value } else { value * 1000.0 };
    DateTime::from_timestamp_millis(millis.round() as i64)
}

const EMAIL_ATOM: &str = r"[\p{L}\p{M}\p{N}!#$%&'*+/=?^_`{|}~-]+";

static EMAIL_LOCAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{EMAIL_ATOM}(\.{EMAIL_ATOM})*$"))
        .expect("email local-part pattern is valid")
});

static DOMAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}]([\p{L}\p{M}\p{N}-]*[\p{L}\p{M}\p{N}])?$")
        .expect("domain label pattern is valid")
});

static TOP_LEVEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\p{L}[\p{L}\p{M}]+|(?i:xn--[a-z0-9-]*[a-z0-9]))$")
        .expect("top-level label pattern is valid")
});

const MAX_EMAIL_CHARS: usize = 254;
const MAX_LOCAL_CHARS: usize = 64;
const MAX_LABEL_CHARS: usize = 63;

/// Syntactic email check: dot-atom local part (Unicode letters allowed),
/// at least two domain labels, internationalized or punycode labels
/// accepted, and an alphabetic or `xn--` top-level label.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().count() > MAX_EMAIL_CHARS {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty()
        || local.chars().count() > MAX_LOCAL_CHARS
        || !EMAIL_LOCAL.is_match(local)
    {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    let Some((top, rest)) = labels.split_last() else {
        return false;
    };
    let fits = |label: &str| label.chars().count() <= MAX_LABEL_CHARS;
    !rest.is_empty()
        && rest.iter().all(|label| fits(label) && DOMAIN_LABEL.is_match(label))
        && fits(top)
        && TOP_LEVEL_LABEL.is_match(top)
}
