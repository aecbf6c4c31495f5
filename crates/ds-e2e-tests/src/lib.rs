//! Test-only crate. All coverage lives under `tests/`.
