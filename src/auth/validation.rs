//! Declarative validation of the sign-up form.
//!
//! Each field has a list of checks evaluated in order; every failing check
//! contributes its message, so the client can show all problems inline at once.
//! Cross-field rules (password confirmation, accepted terms) run afterwards.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::dto::{RegisterForm, Registration};

lazy_static! {
    static ref LETTERS_RE: Regex = Regex::new(r"^[a-zA-Z]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    /// Approximates a mobile-number check: E.164 with a `+` and a non-zero
    /// country code, or a national number with a leading trunk `0`.
    /// Separators are stripped before matching.
    static ref PHONE_RE: Regex = Regex::new(r"^(\+[1-9][0-9]{7,14}|0[0-9]{9,10})$").unwrap();
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    MinChars(usize),
    MaxChars(usize),
    Letters,
    Email,
    MobilePhone,
}

impl Rule {
    fn holds(self, value: &str) -> bool {
        match self {
            Rule::MinChars(n) => value.chars().count() >= n,
            Rule::MaxChars(n) => value.chars().count() <= n,
            Rule::Letters => LETTERS_RE.is_match(value),
            Rule::Email => is_valid_email(value),
            Rule::MobilePhone => {
                let digits: String = value
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
                    .collect();
                PHONE_RE.is_match(&digits)
            }
        }
    }
}

pub struct Check {
    pub rule: Rule,
    pub message: &'static str,
}

pub struct FieldSpec {
    pub name: &'static str,
    pub value: fn(&RegisterForm) -> &str,
    pub checks: &'static [Check],
}

const FIRST_NAME_CHECKS: &[Check] = &[
    Check { rule: Rule::MinChars(2), message: "First name must be at least 2 characters" },
    Check { rule: Rule::MaxChars(45), message: "First name must be less than 45 characters" },
    Check { rule: Rule::Letters, message: "No special character allowed!" },
];

const LAST_NAME_CHECKS: &[Check] = &[
    Check { rule: Rule::MinChars(2), message: "Last name must be at least 2 characters" },
    Check { rule: Rule::MaxChars(45), message: "Last name must be less than 45 characters" },
    Check { rule: Rule::Letters, message: "No special character allowed!" },
];

const EMAIL_CHECKS: &[Check] = &[Check {
    rule: Rule::Email,
    message: "Please enter a valid email address",
}];

const PHONE_CHECKS: &[Check] = &[Check {
    rule: Rule::MobilePhone,
    message: "Please enter a valid phone number",
}];

const PASSWORD_CHECKS: &[Check] = &[
    Check { rule: Rule::MinChars(6), message: "Password must be at least 6 characters" },
    Check { rule: Rule::MaxChars(50), message: "Password must be less than 50 characters" },
];

fn first_name(f: &RegisterForm) -> &str {
    f.first_name.trim()
}
fn last_name(f: &RegisterForm) -> &str {
    f.last_name.trim()
}
fn email(f: &RegisterForm) -> &str {
    f.email.trim()
}
fn phone(f: &RegisterForm) -> &str {
    f.phone.trim()
}
fn password(f: &RegisterForm) -> &str {
    &f.password
}
fn confirm_password(f: &RegisterForm) -> &str {
    &f.confirm_password
}

pub const REGISTER_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "firstName", value: first_name, checks: FIRST_NAME_CHECKS },
    FieldSpec { name: "lastName", value: last_name, checks: LAST_NAME_CHECKS },
    FieldSpec { name: "email", value: email, checks: EMAIL_CHECKS },
    FieldSpec { name: "phone", value: phone, checks: PHONE_CHECKS },
    FieldSpec { name: "password", value: password, checks: PASSWORD_CHECKS },
    FieldSpec { name: "confirmPassword", value: confirm_password, checks: PASSWORD_CHECKS },
];

pub const TERMS_MESSAGE: &str = "Please accept all terms";
pub const MISMATCH_MESSAGE: &str = "Password and confirm password doesn't match!";

/// Field name → messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<&'static str>>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_default().push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn field(&self, name: &str) -> &[&'static str] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().copied().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Canonical form used for storing and looking up emails.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Runs the whole ruleset and yields the flow input on success.
/// The email is lower-cased so lookups are case-insensitive.
pub fn validate_registration(form: &RegisterForm) -> Result<Registration, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for spec in REGISTER_FIELDS {
        let value = (spec.value)(form);
        for check in spec.checks {
            if !check.rule.holds(value) {
                errors.add(spec.name, check.message);
            }
        }
    }

    if !form.accepted {
        errors.add("accepted", TERMS_MESSAGE);
    }
    if form.password != form.confirm_password {
        errors.add("password", MISMATCH_MESSAGE);
        errors.add("confirmPassword", MISMATCH_MESSAGE);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Registration {
        first_name: first_name(form).to_string(),
        last_name: last_name(form).to_string(),
        email: normalize_email(&form.email),
        phone: phone(form).to_string(),
        password: form.password.clone(),
    })
}
