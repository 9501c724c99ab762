//! Authorization token handling
//!
//! Pure helpers shared by the reconciler: [`decode_token`] turns a provider
//! token into a username/password pair and [`resolve_host`] /
//! [`resolve_entry_host`] produce the host strings used for matching.

pub mod decoder;
pub mod host;

pub use decoder::{DecodedCredential, decode_token};
pub use host::{resolve_entry_host, resolve_host};
