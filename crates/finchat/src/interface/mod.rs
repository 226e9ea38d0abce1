//! Terminal interface helpers

pub mod formatter;

pub use formatter::CliFormatter;
