//! Document id generation.
//!
//! Ids are ULIDs from a process-wide monotonic generator, so ids created
//! later compare greater even within the same millisecond. Page queries use
//! the id as the secondary sort key.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use ulid::{Generator, Ulid};

static GENERATOR: Lazy<Mutex<Generator>> = Lazy::new(|| Mutex::new(Generator::new()));

/// Generate a new document id.
pub fn new_document_id() -> String {
    let mut generator = GENERATOR.lock();
    // Overflow only happens after 2^80 ids in one millisecond
    generator
        .generate()
        .unwrap_or_else(|_| Ulid::new())
        .to_string()
}
