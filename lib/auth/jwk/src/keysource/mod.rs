//  MOD.rs
//    by Lut99
//
//  Created:
//    18 Oct 2026, 11:31:40
//  Last edited:
//    18 Oct 2026, 12:02:19
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides sources that produce the issuer's current JSON Web Key Set.
//

// Modules
pub mod fixed;
#[cfg(feature = "http")]
pub mod http;

// Imports
use std::error::Error;
use std::future::Future;

pub use fixed::FixedKeySource;
#[cfg(feature = "http")]
pub use http::HttpKeySource;
use jsonwebtoken::jwk::JwkSet;


/***** LIBRARY *****/
/// The trait implemented by things that know where an issuer publishes its keys.
///
/// Sources don't cache; that's up to the [`KeyResolver`](crate::keyresolver::KeyResolver) owning
/// them. Every call to [`KeySetSource::fetch()`] should return the key set as it is _now_.
pub trait KeySetSource {
    /// The errors produced when the key set cannot be obtained.
    type Error: 'static + Send + Sync + Error;


    /// Obtains the current key set.
    ///
    /// # Returns
    /// The issuer's [`JwkSet`].
    ///
    /// # Errors
    /// This function errors if the key set could not be obtained or was not a valid key set.
    fn fetch(&self) -> impl Send + Future<Output = Result<JwkSet, Self::Error>>;
}
