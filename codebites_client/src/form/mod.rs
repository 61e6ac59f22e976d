//! The register/login form as a value.
//!
//! A [`FormSession`] never changes in place: every transition goes through
//! [`FormSession::reduce`], which takes the old session and a [`FormEvent`] and
//! returns a new session. Rules are re-evaluated as part of every transition
//! that touches the field values, so `is_valid` is always current by the time
//! anything renders the submit control.

use crate::rules::{all_valid, first_failure, RuleSet, ValidationRule};
use std::{
    fmt::{self, Display, Formatter},
    sync::Arc,
};
use tracing::trace;

pub use models::{CredentialPayload, Field, FieldValues, FormKind};

mod models;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
    /// Terminal; the surrounding session now owns the authenticated state.
    Authenticated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    FieldChanged { field: Field, value: String },
    KindChanged(FormKind),
    SubmitStarted,
    SubmitSucceeded,
    SubmitFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    UnknownKind(String),
    UnknownField(String),
    FieldNotInForm { field: Field, kind: FormKind },
    NotEditing(FormState),
    NotSubmitting(FormState),
    /// Carries the message of the first failing rule.
    Invalid(&'static str),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            FormError::UnknownKind(ref k) => write!(f, "unknown form type: {}", k),
            FormError::UnknownField(ref name) => write!(f, "unknown field: {}", name),
            FormError::FieldNotInForm { field, kind } => {
                write!(f, "the {} form has no {} field", kind, field)
            }
            FormError::NotEditing(state) => write!(f, "form is not editable while {:?}", state),
            FormError::NotSubmitting(state) => {
                write!(f, "no submission in flight (form is {:?})", state)
            }
            FormError::Invalid(message) => write!(f, "form is invalid: {}", message),
        }
    }
}

impl std::error::Error for FormError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
        }
    }
}

/// What to show when a form is requested.
#[derive(Debug, Clone, PartialEq)]
pub enum Mount {
    Redirect(Route),
    Form(FormSession),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSession {
    kind: FormKind,
    values: FieldValues,
    rules: Vec<ValidationRule>,
    is_valid: bool,
    state: FormState,
    rule_set: Arc<RuleSet>,
}

impl FormSession {
    pub fn new(kind: FormKind) -> Self {
        Self::with_rule_set(kind, RuleSet::standard())
    }

    pub fn with_rule_set(kind: FormKind, rule_set: Arc<RuleSet>) -> Self {
        Self::evaluated(kind, FieldValues::default(), FormState::Editing, rule_set)
    }

    /// An authenticated user never gets an editable form.
    pub fn mount(kind: FormKind, is_authenticated: bool) -> Mount {
        if is_authenticated {
            trace!("already authenticated, redirecting away from the {} form", kind);
            Mount::Redirect(Route::Home)
        } else {
            Mount::Form(Self::new(kind))
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Every rule of the catalogue, in declaration order.
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// The rules displayed for the current kind.
    pub fn active_rules(&self) -> impl Iterator<Item = &ValidationRule> {
        self.rules.iter().filter(|r| r.applicable())
    }

    pub fn primary_error(&self) -> Option<&'static str> {
        first_failure(&self.rules).map(|r| r.message())
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == FormState::Authenticated
    }

    pub fn can_submit(&self) -> bool {
        self.state == FormState::Editing && self.is_valid
    }

    pub fn payload(&self) -> CredentialPayload {
        CredentialPayload::new(self.kind, &self.values)
    }

    pub fn reduce(&self, event: FormEvent) -> Result<FormSession, FormError> {
        match event {
            FormEvent::FieldChanged { field, value } => {
                self.expect_state(FormState::Editing)?;
                if !self.kind.has_field(field) {
                    return Err(FormError::FieldNotInForm {
                        field,
                        kind: self.kind,
                    });
                }
                Ok(Self::evaluated(
                    self.kind,
                    self.values.with(field, value),
                    FormState::Editing,
                    self.rule_set.clone(),
                ))
            }
            FormEvent::KindChanged(kind) => Ok(Self::with_rule_set(kind, self.rule_set.clone())),
            FormEvent::SubmitStarted => {
                self.expect_state(FormState::Editing)?;
                if !self.is_valid {
                    // An empty field with every rule passing has no message of its own.
                    let message = self.primary_error().unwrap_or("All fields are required.");
                    return Err(FormError::Invalid(message));
                }
                Ok(Self {
                    state: FormState::Submitting,
                    ..self.clone()
                })
            }
            FormEvent::SubmitSucceeded => {
                self.expect_state(FormState::Submitting)?;
                Ok(Self::evaluated(
                    self.kind,
                    FieldValues::default(),
                    FormState::Authenticated,
                    self.rule_set.clone(),
                ))
            }
            FormEvent::SubmitFailed => {
                self.expect_state(FormState::Submitting)?;
                Ok(Self {
                    state: FormState::Editing,
                    ..self.clone()
                })
            }
        }
    }

    pub fn on_field_change(&self, name: &str, value: &str) -> Result<FormSession, FormError> {
        self.reduce(FormEvent::FieldChanged {
            field: name.parse()?,
            value: value.to_owned(),
        })
    }

    pub fn on_kind_change(&self, kind: FormKind) -> FormSession {
        Self::with_rule_set(kind, self.rule_set.clone())
    }

    fn expect_state(&self, expected: FormState) -> Result<(), FormError> {
        match (expected, self.state) {
            (a, b) if a == b => Ok(()),
            (FormState::Submitting, actual) => Err(FormError::NotSubmitting(actual)),
            (_, actual) => Err(FormError::NotEditing(actual)),
        }
    }

    fn evaluated(
        kind: FormKind,
        values: FieldValues,
        state: FormState,
        rule_set: Arc<RuleSet>,
    ) -> Self {
        let rules = rule_set.evaluate(&values, kind);
        let is_valid = all_valid(&rules, &values, kind);
        Self {
            kind,
            values,
            rules,
            is_valid,
            state,
            rule_set,
        }
    }
}
