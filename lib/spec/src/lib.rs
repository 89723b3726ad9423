//  LIB.rs
//    by Lut99
//
//  Created:
//    18 Oct 2024, 17:38:02
//  Last edited:
//    18 Oct 2026, 10:20:44
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides the public interfaces shared by token verifiers and the
//!   resource servers consuming them.
//

// Declare modules
pub mod bearer;
pub mod principal;
pub mod verifier;

// Import some things into the main scope
pub use principal::Principal;
pub use verifier::TokenVerifier;
