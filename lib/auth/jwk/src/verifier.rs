//  VERIFIER.rs
//    by Lut99
//
//  Created:
//    23 Oct 2024, 10:37:53
//  Last edited:
//    18 Oct 2026, 15:12:48
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides the actual [`TokenVerifier`] implementation.
//

use std::error::Error;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use error_trace::ErrorTrace as _;
use futures::FutureExt as _;
use jsonwebtoken::{Algorithm, Header, Validation};
use serde::Deserialize;
use specifications::principal::UNKNOWN_CLIENT;
use specifications::{Principal, TokenVerifier};
use thiserror::Error;
use tracing::{Instrument as _, Level, debug, error, info, span};

use crate::config::VerifierConfig;
use crate::keyresolver::{KeyResolver, SigningKey};


/***** ERRORS *****/
/// Represents verifier-side errors which the client can't fix.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The embedded [`KeyResolver`] failed to resolve a key due to some server-side error.
    #[error("Failed to resolve key")]
    KeyResolve {
        #[source]
        err: Box<dyn 'static + Send + Sync + Error>,
    },
}

/// Represents client-side errors, i.e., something is wrong with the token.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The token is signed with an algorithm we don't accept.
    #[error("JWT is signed with {alg:?}, which is not one of the allowed algorithms {allowed:?}")]
    AlgorithmNotAllowed { alg: Algorithm, allowed: Vec<Algorithm> },
    /// The token is signed with a different algorithm than its key was published for.
    #[error("JWT is signed with {alg:?}, but key {kid:?} is published for {expected:?}")]
    AlgorithmKeyMismatch { alg: Algorithm, kid: String, expected: Algorithm },
    /// The token was not a valid JWT at all.
    #[error("Illegal JWT")]
    IllegalJwt {
        #[source]
        err: jsonwebtoken::errors::Error,
    },
    /// The token has no `iat` claim.
    #[error("JWT is missing the \"iat\" claim")]
    IssuedAtMissing,
    /// The token claims to be issued after now.
    #[error("JWT is issued in the future (iat: {iat}, now: {now})")]
    IssuedInFuture { iat: u64, now: u64 },
    /// The token's signature and standard claims checked out, but the claims we normalize had the
    /// wrong shape.
    #[error("JWT claims are malformed")]
    IllegalClaims {
        #[source]
        err: serde_json::Error,
    },
    /// The embedded [`KeyResolver`] failed to resolve a key due to some client-side error.
    #[error("Failed to resolve key")]
    KeyResolve {
        #[source]
        err: Box<dyn 'static + Send + Sync + Error>,
    },
    /// Failed to validate the JWT's signature or standard claims.
    #[error("Failed to validate JWT")]
    JwtValidate {
        #[source]
        err: jsonwebtoken::errors::Error,
    },
}





/***** HELPERS *****/
/// The claims we read after validation, on top of what [`Validation`] checks for us.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    iat: Option<u64>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    azp: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    permissions: Option<Vec<String>>,
}
impl Claims {
    /// Finds the client that requested the token.
    fn client(&self) -> String {
        [&self.azp, &self.client_id].into_iter().flatten().find(|id| !id.is_empty()).cloned().unwrap_or_else(|| UNKNOWN_CLIENT.into())
    }

    /// Finds the scopes granted to the token.
    ///
    /// Auth0 puts them in `scope` for user-delegated tokens and in `permissions` when RBAC is
    /// enabled for the API.
    fn scopes(self) -> Vec<String> {
        match (self.scope, self.permissions) {
            (Some(scope), _) => scope.split_whitespace().map(String::from).collect(),
            (None, Some(permissions)) => permissions,
            (None, None) => Vec::new(),
        }
    }
}





/***** LIBRARY *****/
/// Verifies access tokens issued by an Auth0-style identity provider.
///
/// Keys are found through the embedded [`KeyResolver`]; everything else is decided by the
/// [`VerifierConfig`].
#[derive(Debug)]
pub struct Auth0Verifier<K> {
    /// Decides which tokens we accept.
    config:   VerifierConfig,
    /// Finds the keys that we use to verify JWTs.
    resolver: K,
}
impl<K> Auth0Verifier<K> {
    /// Constructor for the Auth0Verifier.
    ///
    /// # Arguments
    /// - `config`: The [`VerifierConfig`] naming the issuer, audience and accepted algorithms.
    /// - `resolver`: Something implementing [`KeyResolver`] that resolves JWT headers to
    ///   appropriate keys for validation.
    ///
    /// # Returns
    /// A new instance of Self, ready to rumble.
    #[inline]
    pub fn new(config: VerifierConfig, resolver: K) -> Self { Self { config, resolver } }

    /// The configuration of this verifier.
    #[inline]
    pub fn config(&self) -> &VerifierConfig { &self.config }

    /// The key resolver of this verifier.
    #[inline]
    pub fn resolver(&self) -> &K { &self.resolver }
}
#[cfg(feature = "http")]
impl Auth0Verifier<crate::keyresolver::JwksResolver<crate::keysource::HttpKeySource>> {
    /// Constructor for the Auth0Verifier that downloads keys from the issuer's well-known key set
    /// endpoint.
    ///
    /// # Arguments
    /// - `config`: The [`VerifierConfig`] naming the issuer, audience and accepted algorithms.
    ///
    /// # Errors
    /// This function errors if the HTTP client for the key set endpoint could not be built.
    pub fn from_config(config: VerifierConfig) -> Result<Self, crate::config::ConfigError> {
        use crate::keyresolver::JwksResolver;
        use crate::keysource::HttpKeySource;
        use crate::keysource::http::DEFAULT_TIMEOUT;

        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build().map_err(|err| crate::config::ConfigError::HttpClient { err })?;
        let source = HttpKeySource::with_client(config.jwks_url(), client);
        Ok(Self::new(config, JwksResolver::new(source)))
    }
}
impl<K: KeyResolver> Auth0Verifier<K> {
    /// Does the actual verification.
    ///
    /// # Returns
    /// The [`Principal`] for the token.
    ///
    /// # Errors
    /// Like the [`KeyResolver`], this function errors at two levels: the _outer_ [`Result`]
    /// for problems on our side, the _inner_ for problems with the token.
    async fn authenticate(&self, token: &str) -> Result<Result<Principal, ClientError>, ServerError> {
        // Fetch the header from the JWT
        let header: Header = match jsonwebtoken::decode_header(token) {
            Ok(header) => header,
            Err(err) => return Ok(Err(ClientError::IllegalJwt { err })),
        };
        debug!("JWT header: {header:?}");

        // Refuse any algorithm we didn't explicitly allow before even looking at keys
        if !self.config.algorithms().contains(&header.alg) {
            return Ok(Err(ClientError::AlgorithmNotAllowed { alg: header.alg, allowed: self.config.algorithms().to_vec() }));
        }

        // Check if the key makes sense
        debug!("Resolving key in keystore...");
        let key: SigningKey = match self.resolver.resolve_key(&header).await {
            Ok(Ok(key)) => key,
            Ok(Err(err)) => return Ok(Err(ClientError::KeyResolve { err: Box::new(err) })),
            Err(err) => return Err(ServerError::KeyResolve { err: Box::new(err) }),
        };
        if let Some(expected) = key.algorithm() {
            if expected != header.alg {
                return Ok(Err(ClientError::AlgorithmKeyMismatch { alg: header.alg, kid: key.kid().into(), expected }));
            }
        }

        // Validate signature, issuer, audience, expiry and not-before
        let mut validation = Validation::new(header.alg);
        validation.leeway = self.config.leeway();
        validation.validate_nbf = true;
        validation.set_audience(&[self.config.audience()]);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        debug!("Validating JWT with {:?}...", header.alg);
        let claims: serde_json::Value = match jsonwebtoken::decode::<serde_json::Value>(token, key.decoding_key(), &validation) {
            Ok(res) => res.claims,
            Err(err) => return Ok(Err(ClientError::JwtValidate { err })),
        };
        let claims: Claims = match serde_json::from_value(claims) {
            Ok(claims) => claims,
            Err(err) => return Ok(Err(ClientError::IllegalClaims { err })),
        };

        // `Validation` doesn't look at `iat`, so we do
        let now: u64 = jsonwebtoken::get_current_timestamp();
        match claims.iat {
            Some(iat) if iat > now.saturating_add(self.config.leeway()) => return Ok(Err(ClientError::IssuedInFuture { iat, now })),
            Some(_) => {},
            None => return Ok(Err(ClientError::IssuedAtMissing)),
        }
        debug!("Validating OK");

        // Normalize
        let client_id: String = claims.client();
        let expires_at: Option<i64> = claims.exp;
        Ok(Ok(Principal { token: token.into(), client_id, scopes: claims.scopes(), expires_at, resource: self.config.audience().into() }))
    }
}
impl<K> TokenVerifier for Auth0Verifier<K>
where
    K: Send + Sync + KeyResolver,
{
    fn verify(&self, token: &str) -> impl Send + Future<Output = Option<Principal>> {
        async move {
            debug!("Handling JWT verification");

            // Whatever happens in here, it must never look like a success
            match AssertUnwindSafe(self.authenticate(token)).catch_unwind().await {
                Ok(Ok(Ok(principal))) => {
                    info!("Accepted token of client {:?} (scopes: {:?})", principal.client_id, principal.scopes);
                    Some(principal)
                },
                Ok(Ok(Err(err))) => {
                    info!("Rejected token: {}", err.trace());
                    None
                },
                Ok(Err(err)) => {
                    error!("Rejected token: {}", err.trace());
                    None
                },
                Err(_) => {
                    error!("Rejected token: verification panicked");
                    None
                },
            }
        }
        .instrument(span!(Level::INFO, "Auth0Verifier::verify"))
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    fn claims(value: serde_json::Value) -> Claims { serde_json::from_value(value).unwrap() }

    #[test]
    fn test_client_fallback() {
        assert_eq!(claims(serde_json::json!({ "azp": "abc123", "client_id": "xyz" })).client(), "abc123");
        assert_eq!(claims(serde_json::json!({ "client_id": "xyz" })).client(), "xyz");
        assert_eq!(claims(serde_json::json!({ "azp": "", "client_id": "xyz" })).client(), "xyz");
        assert_eq!(claims(serde_json::json!({ "azp": "", "client_id": "" })).client(), UNKNOWN_CLIENT);
        assert_eq!(claims(serde_json::json!({})).client(), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_scope_sources() {
        assert_eq!(claims(serde_json::json!({ "scope": "read:videos write:videos" })).scopes(), vec!["read:videos", "write:videos"]);
        assert_eq!(claims(serde_json::json!({ "permissions": ["read:videos"] })).scopes(), vec!["read:videos"]);
        assert_eq!(claims(serde_json::json!({ "scope": "a", "permissions": ["b"] })).scopes(), vec!["a"]);
        assert_eq!(claims(serde_json::json!({ "scope": "" })).scopes(), Vec::<String>::new());
        assert_eq!(claims(serde_json::json!({})).scopes(), Vec::<String>::new());
    }
}
