//  VERIFIER.rs
//    by Lut99
//
//  Created:
//    23 Oct 2024, 10:31:06
//  Last edited:
//    18 Oct 2026, 11:02:51
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the [`TokenVerifier`] trait, which turns a bearer token into
//!   a [`Principal`] (or nothing at all).
//

use std::future::Future;

use http::HeaderMap;
use tracing::{Instrument as _, Level, info, span};

use crate::bearer;
use crate::principal::Principal;


/***** LIBRARY *****/
/// A verifier that takes an access token and (hopefully) turns it into a [`Principal`].
///
/// Note that the TokenVerifier is intended to be used in a distributed context. As such, any
/// reference to `self` is done immutably only.
///
/// Verification is fail-closed: any problem with the token, or with the verifier itself, results
/// in [`None`]. Callers should treat that as "unauthenticated" without trying to find out why;
/// the reason is only ever reported through the log.
pub trait TokenVerifier {
    /// Verifies the given compact token.
    ///
    /// # Arguments
    /// - `token`: The raw token as presented by the client.
    ///
    /// # Returns
    /// A [`Principal`] describing the client if the token is valid, or [`None`] otherwise.
    fn verify(&self, token: &str) -> impl Send + Future<Output = Option<Principal>>;

    /// Verifies the bearer token found in the `Authorization`-header of a request.
    ///
    /// # Arguments
    /// - `headers`: The headers of the HTTP request to authorize.
    ///
    /// # Returns
    /// A [`Principal`] if the request carried a valid bearer token, or [`None`] otherwise (also
    /// when there is no such header at all).
    fn authorize(&self, headers: &HeaderMap) -> impl Send + Future<Output = Option<Principal>>
    where
        Self: Sync,
    {
        async move {
            let token: &str = match bearer::extract_from_headers(headers) {
                Ok(token) => token,
                Err(err) => {
                    info!("Rejecting request: {err}");
                    return None;
                },
            };
            self.verify(token).await
        }
        .instrument(span!(Level::INFO, "TokenVerifier::authorize"))
    }
}





/***** TESTS *****/
