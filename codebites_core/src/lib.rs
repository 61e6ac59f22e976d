#[cfg(test)]
#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate lazy_static;

pub use config::{Config, ConfigError, CONFIG};
pub use error::Error;
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
pub use telemetry::init_tracing;

mod config;
mod error;
mod session;
mod telemetry;
