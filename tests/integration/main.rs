//! Integration tests

mod admission_test;
mod config_test;
mod lifecycle_test;
