//! API integration tests, run against the in-memory repository

mod api_tests;
mod borrow_tests;
mod common;
