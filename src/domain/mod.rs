//! Domain models for articles and translation payloads.

pub mod articles;
pub mod translation;
