//! Unit tests for the validation and output adapters.
