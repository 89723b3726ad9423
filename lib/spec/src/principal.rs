//  PRINCIPAL.rs
//    by Lut99
//
//  Created:
//    18 Oct 2024, 17:50:16
//  Last edited:
//    18 Oct 2026, 10:31:02
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the normalized result of a successful token verification.
//

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};


/***** CONSTANTS *****/
/// The client identifier reported when a token names neither an `azp` nor a `client_id`.
pub const UNKNOWN_CLIENT: &str = "unknown";





/***** LIBRARY *****/
/// Defines who (or rather, which client) presented a verified access token, and what it was
/// granted.
///
/// Only ever produced by a [`TokenVerifier`](crate::TokenVerifier) after the token's signature
/// and standard claims have been checked.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Principal {
    /// The raw, compact token this principal was derived from.
    pub token: String,
    /// The client that requested the token (`azp`, else `client_id`, else [`UNKNOWN_CLIENT`]).
    pub client_id: String,
    /// The scopes granted to the token, in the order the issuer listed them.
    ///
    /// Note that these are informational only; nothing in this library enforces them.
    pub scopes: Vec<String>,
    /// When the token expires, in seconds since the Unix epoch.
    pub expires_at: Option<i64>,
    /// The resource (audience) this token was validated against.
    pub resource: String,
}
impl Principal {
    /// Checks whether the token was granted the given scope.
    ///
    /// # Arguments
    /// - `scope`: The scope to look for, e.g., `read:videos`.
    ///
    /// # Returns
    /// True if the scope is in [`Principal::scopes`], false otherwise.
    #[inline]
    pub fn has_scope(&self, scope: &str) -> bool { self.scopes.iter().any(|s| s == scope) }

    /// Returns the expiry time as a timestamp.
    ///
    /// # Returns
    /// A [`DateTime<Utc>`], or [`None`] if the token carried no expiry or it is out of range.
    #[inline]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> { self.expires_at.and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)) }
}





/***** TESTS *****/
