//! Integration tests for serialized per-path file handles

mod concurrency;
mod identity;
mod support;
