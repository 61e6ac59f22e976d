use serde::Serialize;
use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use super::FormError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Register,
    Login,
}

impl FormKind {
    /// Fields shown to the user, in display order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            FormKind::Register => &[Field::Username, Field::Email, Field::Password],
            FormKind::Login => &[Field::Email, Field::Password],
        }
    }

    pub fn has_field(self, field: Field) -> bool {
        self.fields().contains(&field)
    }

    /// Last path segment of the credential exchange, i.e. `/login/{endpoint}`.
    pub fn endpoint(self) -> &'static str {
        match self {
            FormKind::Register => "register",
            FormKind::Login => "login",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FormKind::Register => "Register",
            FormKind::Login => "Log In",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            FormKind::Register => "User already exists.",
            FormKind::Login => "Login failed.",
        }
    }
}

impl Display for FormKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormKind::Register => "Register",
            FormKind::Login => "Login",
        })
    }
}

impl FromStr for FormKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "register" => Ok(FormKind::Register),
            "login" => Ok(FormKind::Login),
            _ => Err(FormError::UnknownKind(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Email,
    Password,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Email => "email",
            Field::Password => "password",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "username" => Ok(Field::Username),
            "email" => Ok(Field::Email),
            "password" => Ok(Field::Password),
            _ => Err(FormError::UnknownField(s.to_owned())),
        }
    }
}

/// In-progress form input. Only ever replaced wholesale, see [`FieldValues::with`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    username: String,
    email: String,
    password: String,
}

impl FieldValues {
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.username,
            Field::Email => &self.email,
            Field::Password => &self.password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn with(&self, field: Field, value: String) -> Self {
        let mut values = self.clone();
        match field {
            Field::Username => values.username = value,
            Field::Email => values.email = value,
            Field::Password => values.password = value,
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.email.is_empty() && self.password.is_empty()
    }
}

// Hand-written so a password never ends up in the logs.
impl Debug for FieldValues {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValues")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &redact(&self.password))
            .finish()
    }
}

/// Body of `POST /login/{register|login}`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CredentialPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    email: String,
    password: String,
}

impl CredentialPayload {
    pub fn new(kind: FormKind, values: &FieldValues) -> Self {
        Self {
            username: match kind {
                FormKind::Register => Some(values.username.clone()),
                FormKind::Login => None,
            },
            email: values.email.clone(),
            password: values.password.clone(),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Debug for CredentialPayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPayload")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &redact(&self.password))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}
