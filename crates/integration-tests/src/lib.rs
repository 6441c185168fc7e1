//! End-to-end tests for the generation pipeline live under `tests/`
