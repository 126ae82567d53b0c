//! Wire types shared by the certificate directory client and its front ends.
//!
//! [`views`] holds the response bodies the certificate API returns, and
//! [`params`] holds the request bodies the client sends.

pub mod params;
pub mod views;
