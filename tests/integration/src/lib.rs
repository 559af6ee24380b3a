//! Cross-crate integration tests for CredTrust live in `tests/`.
