//  KEYRESOLVER.rs
//    by Lut99
//
//  Created:
//    23 Oct 2024, 10:58:43
//  Last edited:
//    18 Oct 2026, 12:58:10
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides resolvers for JWT keys.
//

// Modules
pub mod jwks;

// Imports
use std::error::Error;
use std::future::Future;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey, Header};
pub use jwks::JwksResolver;


/***** HELPERS *****/
/// Maps a JWK's declared algorithm to the signing algorithm it names.
///
/// # Returns
/// The matching [`Algorithm`], or [`None`] if the key is declared for encryption instead.
fn signing_algorithm(alg: &KeyAlgorithm) -> Option<Algorithm> {
    match alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}





/***** LIBRARY *****/
/// An issuer's public key, ready to verify signatures with.
///
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct SigningKey {
    /// The key identifier under which the issuer published this key.
    kid: String,
    /// The algorithm the issuer declared for this key, if any.
    algorithm: Option<Algorithm>,
    /// The key material itself.
    key: DecodingKey,
}
impl SigningKey {
    /// Constructor for the SigningKey.
    ///
    /// # Arguments
    /// - `kid`: The key identifier.
    /// - `algorithm`: The only algorithm this key may be used with, or [`None`] to let the
    ///   verifier's allow-list decide on its own.
    /// - `key`: The [`DecodingKey`] to verify with.
    #[inline]
    pub fn new(kid: impl Into<String>, algorithm: Option<Algorithm>, key: DecodingKey) -> Self { Self { kid: kid.into(), algorithm, key } }

    /// Builds a SigningKey from a published JSON Web Key.
    ///
    /// # Arguments
    /// - `kid`: The key identifier it was found under.
    /// - `jwk`: The [`Jwk`] to convert.
    ///
    /// # Errors
    /// This function errors if the key material is not usable for signature verification, or if
    /// it declares an algorithm that isn't a signing algorithm.
    pub fn from_jwk(kid: impl Into<String>, jwk: &Jwk) -> Result<Self, jsonwebtoken::errors::Error> {
        let algorithm: Option<Algorithm> = match &jwk.common.key_algorithm {
            Some(alg) => Some(signing_algorithm(alg).ok_or(ErrorKind::InvalidAlgorithmName)?),
            None => None,
        };
        let key: DecodingKey = DecodingKey::from_jwk(jwk)?;
        Ok(Self { kid: kid.into(), algorithm, key })
    }

    /// The key identifier.
    #[inline]
    pub fn kid(&self) -> &str { &self.kid }

    /// The algorithm declared for this key, if any.
    #[inline]
    pub fn algorithm(&self) -> Option<Algorithm> { self.algorithm }

    /// The key material.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey { &self.key }
}



/// The trait implemented by various backends.
///
/// Note that the KeyResolver is intended to be used in a distributed context. As such, any
/// reference to `self` is done immutably only.
pub trait KeyResolver {
    /// Client-side errors produced by the KeyResolver.
    type ClientError: 'static + Send + Sync + Error;
    /// Server-side errors produced by the KeyResolver.
    type ServerError: 'static + Send + Sync + Error;


    /// Provides the correct key to verify the JWT with based on its (unverified) header.
    ///
    /// # Arguments
    /// - `header`: The JWT [`Header`] that tells us which key to find.
    ///
    /// # Returns
    /// A [`SigningKey`] that can be used to verify the JWT.
    ///
    /// # Errors
    /// This function may error if we failed to obtain the key somehow.
    ///
    /// There are two levels at which it can do so:
    /// - The _outer_ [`Result`] is used to indicate _server_ errors (e.g., key set endpoint
    ///   unreachable, etc); and
    /// - The _inner_ [`Result`] is used to indicate _client_ errors (e.g., no key ID, unknown key,
    ///   etc).
    ///
    /// Verifiers collapse both into a rejection, but log them differently.
    fn resolve_key(&self, header: &Header) -> impl Send + Future<Output = Result<Result<SigningKey, Self::ClientError>, Self::ServerError>>;
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_jwk_keeps_declared_algorithm() {
        let jwk: Jwk = serde_json::from_str(include_str!("../../tests/fixtures/rsa_public_1.jwk.json")).unwrap();
        let key = SigningKey::from_jwk("test-key-1", &jwk).unwrap();
        assert_eq!(key.kid(), "test-key-1");
        assert_eq!(key.algorithm(), Some(Algorithm::RS256));
    }

    #[test]
    fn test_signing_algorithm_mapping() {
        assert_eq!(signing_algorithm(&KeyAlgorithm::RS256), Some(Algorithm::RS256));
        assert_eq!(signing_algorithm(&KeyAlgorithm::PS512), Some(Algorithm::PS512));
        assert_eq!(signing_algorithm(&KeyAlgorithm::ES384), Some(Algorithm::ES384));
        assert_eq!(signing_algorithm(&KeyAlgorithm::EdDSA), Some(Algorithm::EdDSA));
        assert_eq!(signing_algorithm(&KeyAlgorithm::RSA_OAEP), None);
        assert_eq!(signing_algorithm(&KeyAlgorithm::RSA1_5), None);
    }

    #[test]
    fn test_from_jwk_rejects_encryption_algorithm() {
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kty": "RSA", "kid": "enc", "alg": "RSA-OAEP", "n": "AQAB", "e": "AQAB"
        }))
        .unwrap();
        assert!(SigningKey::from_jwk("enc", &jwk).is_err());
    }
}
