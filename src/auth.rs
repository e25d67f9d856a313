//! Credentials, redacted secrets, and the in-memory access-token model.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::{record::*, secret::*};
