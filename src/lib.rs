//  LIB.rs
//    by Lut99
//
//  Created:
//    18 Oct 2024, 17:31:50
//  Last edited:
//    18 Oct 2026, 10:12:31
//  Auto updated?
//    Yes
//
//  Description:
//!   Verifies OAuth2 access tokens issued by an
//!   [Auth0](https://auth0.com)-style identity provider on behalf of a
//!   resource server.
//

// Import the libraries
pub mod auth {
    #[cfg(feature = "jwk-auth")]
    pub use jwk_auth as jwk;
}

pub use specifications as spec;
