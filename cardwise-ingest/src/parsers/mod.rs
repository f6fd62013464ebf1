//! Source-format-specific catalog parsers.

pub mod csv_catalog;
