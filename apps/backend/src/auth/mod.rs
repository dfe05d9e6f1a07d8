pub mod identity;

pub use identity::{IdentityProvider, StaticIdentity};
