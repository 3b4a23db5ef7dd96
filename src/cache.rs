pub mod credential;

pub use credential::{CredentialCache, fingerprint};
