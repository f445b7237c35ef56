// redactgate/src/lib.rs
//! # redactgate CLI
//!
//! Command-line front end for `redactgate-core`: pattern scanning of arbitrary text,
//! full pipeline runs over a conversation, and rule inspection.
//!
//! License: MIT OR APACHE 2.0

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
