use crate::{api::ApiError, form::FormError};
use std::fmt::{Display, Formatter, Result};

#[derive(Debug)]
pub enum Error {
    Api(ApiError),
    Form(FormError),
    Core(codebites_core::Error),
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(err)
    }
}

impl From<FormError> for Error {
    fn from(err: FormError) -> Self {
        Error::Form(err)
    }
}

impl From<codebites_core::Error> for Error {
    fn from(err: codebites_core::Error) -> Self {
        Error::Core(err)
    }
}

impl From<codebites_core::ConfigError> for Error {
    fn from(err: codebites_core::ConfigError) -> Self {
        Error::Core(err.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            Error::Api(ref e) => write!(f, "{}", e),
            Error::Form(ref e) => write!(f, "{}", e),
            Error::Core(ref e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}
