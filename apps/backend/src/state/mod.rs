pub mod session;

pub use session::{Access, Session};
