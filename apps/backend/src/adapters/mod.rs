//! Adapters for external dependencies.

pub mod documents_sea;
