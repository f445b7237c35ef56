// redactgate/src/ui/mod.rs
//! Terminal rendering helpers.

pub mod output_format;
pub mod theme;
