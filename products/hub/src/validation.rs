//! Per-field input checks. A failing check carries the hint shown next to the
//! field; nothing that fails here is ever written to the database.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{HubError, HubResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

static WEBSITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}(:\d+)?(/\S*)?$")
        .expect("website regex")
});

pub const MIN_PHONE_LEN: usize = 8;

pub const REQUIRED_HINT: &str = "This field is required";
pub const EMAIL_HINT: &str = "Please enter a valid email address";
pub const PHONE_HINT: &str = "Please enter a valid phone number";
pub const WEBSITE_HINT: &str = "Please enter a valid website address";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheck {
    pub is_valid: bool,
    pub hint: Option<&'static str>,
}

impl FieldCheck {
    pub const VALID: FieldCheck = FieldCheck {
        is_valid: true,
        hint: None,
    };

    fn invalid(hint: &'static str) -> Self {
        Self {
            is_valid: false,
            hint: Some(hint),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Phone,
    Website,
}

pub fn validate_field(kind: InputKind, value: &str, required: bool) -> FieldCheck {
    match kind {
        InputKind::Text => {
            if required {
                validate_required(value)
            } else {
                FieldCheck::VALID
            }
        }
        InputKind::Email => validate_email(value, required),
        InputKind::Phone => validate_phone(value, required),
        InputKind::Website => validate_website(value, required),
    }
}

pub fn validate_required(value: &str) -> FieldCheck {
    if value.trim().is_empty() {
        FieldCheck::invalid(REQUIRED_HINT)
    } else {
        FieldCheck::VALID
    }
}

/// Surrounding whitespace is ignored; stored values are trimmed the same way.
pub fn validate_email(value: &str, required: bool) -> FieldCheck {
    let value = value.trim();
    if value.is_empty() {
        return empty_check(required);
    }
    if EMAIL_RE.is_match(value) {
        FieldCheck::VALID
    } else {
        FieldCheck::invalid(EMAIL_HINT)
    }
}

pub fn validate_phone(value: &str, required: bool) -> FieldCheck {
    let value = value.trim();
    if value.is_empty() {
        return empty_check(required);
    }
    if value.chars().count() >= MIN_PHONE_LEN {
        FieldCheck::VALID
    } else {
        FieldCheck::invalid(PHONE_HINT)
    }
}

pub fn validate_website(value: &str, required: bool) -> FieldCheck {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return empty_check(required);
    }
    if WEBSITE_RE.is_match(trimmed) {
        FieldCheck::VALID
    } else {
        FieldCheck::invalid(WEBSITE_HINT)
    }
}

fn empty_check(required: bool) -> FieldCheck {
    if required {
        FieldCheck::invalid(REQUIRED_HINT)
    } else {
        FieldCheck::VALID
    }
}

/// Collects failing checks for a whole input and turns them into one error.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    failures: Vec<String>,
}

impl Checks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.record(field, validate_required(value))
    }

    pub(crate) fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        self.record(field, validate_email(value.unwrap_or_default(), false))
    }

    pub(crate) fn phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        self.record(field, validate_phone(value.unwrap_or_default(), false))
    }

    pub(crate) fn website(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        self.record(field, validate_website(value.unwrap_or_default(), false))
    }

    pub(crate) fn check(&mut self, field: &str, ok: bool, hint: &str) -> &mut Self {
        if !ok {
            self.failures.push(format!("{field}: {hint}"));
        }
        self
    }

    fn record(&mut self, field: &str, check: FieldCheck) -> &mut Self {
        if let Some(hint) = check.hint {
            self.failures.push(format!("{field}: {hint}"));
        }
        self
    }

    pub(crate) fn finish(&self) -> HubResult<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(HubError::Validation(self.failures.join("; ")))
        }
    }
}
