//! Style Enforcement Tests
//!
//! Scans the library and CLI sources for patterns clippy does not catch.
//!
//! - `production_code` - No `#[allow(dead_code)]` and no `unwrap()`/`expect()` outside tests

#[path = "style/production_code.rs"]
mod production_code;
