//! Purpose: Library crate behind the `jsonbundle` CLI and tests.
//! Exports: `api` (codec, resource providers, convention types, errors).
//! Role: Load named bundled JSON resources into typed values and encode them back.
//! Invariants: Date fields follow the codec's decode pattern in and the fixed encode pattern out.
//! Invariants: Binary fields are base64 text; failures are returned, never aborted on.
pub mod api;
pub(crate) mod core;
pub(crate) mod json;
