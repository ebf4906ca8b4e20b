//! Purpose: Internal JSON boundary used by the codec.
//! Exports: `parse` (decode entrypoints + failure categories) and `emit` (compact/pretty output).
//! Role: Single seam for serde_json usage so callsites avoid ad hoc encode/decode logic.
//! Invariants: All codec JSON decoding and encoding goes through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod emit;
pub(crate) mod parse;
