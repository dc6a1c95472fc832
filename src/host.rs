//! Code-host domain models: provider kinds, records, and redacted secrets.

pub mod kind;
pub mod record;
pub mod secret;

pub use kind::*;
pub use record::*;
pub use secret::*;
