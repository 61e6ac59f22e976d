use self::Error::{Config, Io, SerdeJson};
use crate::config::ConfigError;
use std::fmt::{Display, Formatter, Result};

#[derive(Debug)]
pub enum Error {
    SerdeJson(serde_json::error::Error),
    Io(std::io::Error),
    Config(ConfigError),
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        SerdeJson(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Config(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            SerdeJson(ref e) => write!(f, "error serializing/deserializing JSON data: {0}", e),
            Io(ref e) => write!(f, "error accessing client storage: {0}", e),
            Config(ref e) => write!(f, "configuration error: {0}", e),
        }
    }
}

impl std::error::Error for Error {}
