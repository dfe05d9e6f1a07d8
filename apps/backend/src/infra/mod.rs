//! Infrastructure layer - database connection and store error translation.

pub mod db;
pub mod store_errors;
