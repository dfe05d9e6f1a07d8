//! Repository functions over the document store.

pub mod app_config;
pub mod codec;
pub mod comments;
pub mod documents;
pub mod games;
pub mod reports;
