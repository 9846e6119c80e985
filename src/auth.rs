//! Credential pairs, environment selection, and inbound token-request models.

pub mod credential;
pub mod grant;

pub use credential::*;
pub use grant::*;
