//! Property-based tests

mod history_proptest;
