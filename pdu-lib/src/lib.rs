#![doc = include_str!("../README.md")]

mod error;

pub mod deframer;
pub mod pdu;

pub use error::{ConfigError, Error, Result};
