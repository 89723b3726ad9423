//  LIB.rs
//    by Lut99
//
//  Created:
//    23 Oct 2024, 10:37:34
//  Last edited:
//    18 Oct 2026, 15:20:02
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements a JSON Web Token (JWT) / JSON Web Key Set (JWKS)-based
//!   [`TokenVerifier`](specifications::TokenVerifier) for Auth0-style
//!   issuers.
//

// Modules
pub mod config;
pub mod keyresolver;
pub mod keysource;
mod verifier;

// Use some of it into the main namespace
pub use config::{ConfigError, VerifierConfig};
pub use verifier::*;
