//! terramap-eo — client for the remote Earth-observation data platform.
//!
//! The platform is consumed as a black box through a minimal REST surface:
//! exchange service-account credentials for a bearer token, then register a
//! dataset + visualization pair to obtain a tile URL template the widget can
//! draw. Credentials live for a single request and are never cached; the
//! client itself only holds the connection pool.

pub mod client;
pub mod credentials;
pub mod error;

pub use client::{AccessToken, EoClient, TileSource};
pub use credentials::ServiceAccountCredentials;
pub use error::EoError;
