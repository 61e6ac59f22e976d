//! Named validation predicates for the register and login forms.
//!
//! A [`RuleSet`] is an immutable catalogue. Evaluating it against the current
//! [`FieldValues`] yields a fresh, ordered snapshot of [`ValidationRule`]s with
//! their `valid` flags filled in, so no evaluation can observe the result of a
//! previous one (in particular one made for the other form kind).

use crate::form::{Field, FieldValues, FormKind};
use regex::Regex;
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

pub const MIN_USERNAME_LENGTH: usize = 5;
pub const MIN_EMAIL_LENGTH: usize = 5;
pub const MIN_PASSWORD_LENGTH: usize = 10;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref STANDARD: Arc<RuleSet> = Arc::new(RuleSet::new(vec![
        ValidationRule::new(
            "register-username-length",
            FormKind::Register,
            Field::Username,
            "Username must be greater than 5 characters.",
            |v| longer_than(v.username(), MIN_USERNAME_LENGTH),
        ),
        ValidationRule::new(
            "register-email-length",
            FormKind::Register,
            Field::Email,
            "Email must be greater than 5 characters.",
            |v| longer_than(v.email(), MIN_EMAIL_LENGTH),
        ),
        ValidationRule::new(
            "register-email-format",
            FormKind::Register,
            Field::Email,
            "Email must be a valid email address.",
            |v| EMAIL_RE.is_match(v.email()),
        ),
        ValidationRule::new(
            "register-password-length",
            FormKind::Register,
            Field::Password,
            "Password must be greater than 10 characters.",
            |v| longer_than(v.password(), MIN_PASSWORD_LENGTH),
        ),
        ValidationRule::new(
            "login-email-required",
            FormKind::Login,
            Field::Email,
            "Email is required.",
            |v| !v.email().is_empty(),
        ),
        ValidationRule::new(
            "login-password-required",
            FormKind::Login,
            Field::Password,
            "Password is required.",
            |v| !v.password().is_empty(),
        ),
    ]));
}

/// Must be free of side effects; rules are re-run on every keystroke.
pub type Predicate = fn(&FieldValues) -> bool;

fn longer_than(value: &str, min: usize) -> bool {
    value.chars().count() > min
}

#[derive(Clone, Copy)]
pub struct ValidationRule {
    id: &'static str,
    applies_to: FormKind,
    field: Field,
    message: &'static str,
    predicate: Predicate,
    valid: bool,
    applicable: bool,
}

impl ValidationRule {
    pub fn new(
        id: &'static str,
        applies_to: FormKind,
        field: Field,
        message: &'static str,
        predicate: Predicate,
    ) -> Self {
        Self {
            id,
            applies_to,
            field,
            message,
            predicate,
            valid: false,
            applicable: false,
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn applies_to(&self) -> FormKind {
        self.applies_to
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Whether the rule takes part in the validity of the form it was last
    /// evaluated for.
    pub fn applicable(&self) -> bool {
        self.applicable
    }

    fn evaluate(&self, values: &FieldValues, kind: FormKind) -> Self {
        let applicable = self.applies_to == kind && kind.has_field(self.field);
        Self {
            valid: applicable && (self.predicate)(values),
            applicable,
            ..*self
        }
    }
}

impl Debug for ValidationRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("id", &self.id)
            .field("applies_to", &self.applies_to)
            .field("field", &self.field)
            .field("valid", &self.valid)
            .field("applicable", &self.applicable)
            .finish()
    }
}

// Predicates are identified by their rule id.
impl PartialEq for ValidationRule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.applies_to == other.applies_to
            && self.field == other.field
            && self.message == other.message
            && self.valid == other.valid
            && self.applicable == other.applicable
    }
}

#[derive(Debug, PartialEq)]
pub struct RuleSet {
    rules: Vec<ValidationRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ValidationRule>) -> Self {
        Self { rules }
    }

    /// The rules every form is validated against unless told otherwise.
    pub fn standard() -> Arc<RuleSet> {
        STANDARD.clone()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Re-evaluates every rule for `kind`, in declaration order. Rules of the
    /// other kind come back with `valid == false` and `applicable == false`.
    pub fn evaluate(&self, values: &FieldValues, kind: FormKind) -> Vec<ValidationRule> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(values, kind))
            .collect()
    }
}

/// True iff every applicable rule passes and no field of `kind` is empty.
pub fn all_valid(rules: &[ValidationRule], values: &FieldValues, kind: FormKind) -> bool {
    kind.fields().iter().all(|f| !values.get(*f).is_empty())
        && rules.iter().filter(|r| r.applicable).all(|r| r.valid)
}

/// The rule whose message is shown as the primary error.
pub fn first_failure(rules: &[ValidationRule]) -> Option<&ValidationRule> {
    rules.iter().find(|r| r.applicable && !r.valid)
}
