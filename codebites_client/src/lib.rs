#[cfg(test)]
#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate lazy_static;

pub use app::{App, WELCOME_MESSAGE};
pub use error::Error;

pub mod api;
pub mod form;
pub mod notify;
pub mod rules;
pub mod views;

mod app;
mod error;
