//! Request bodies sent to the certificate API.

mod certificate;
pub use certificate::*;
