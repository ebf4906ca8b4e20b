// Core modules implementing date conventions and error modeling.
pub mod convention;
pub mod date_pattern;
pub mod error;
