//! Command implementations for the Voxtune CLI.

pub mod info;
pub mod resolve;
pub mod validate;
