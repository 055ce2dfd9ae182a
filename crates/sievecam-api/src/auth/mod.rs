//! Upload authorization: short-lived signed tokens.

pub mod token;
