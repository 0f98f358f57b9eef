//! Credential and bearer-token models.

pub mod credential;
pub mod secret;
pub mod token;

pub use credential::*;
pub use secret::*;
pub use token::*;
