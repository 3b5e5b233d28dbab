//! Shared helpers for unit tests: socket guards and scripted fetchers.

pub mod socket_guard;
pub mod stub_fetcher;
