//! Helpers shared by the integration tests: test keys, token minting and counting key sources.
#![allow(dead_code)]

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use jwk_auth::keyresolver::JwksResolver;
use jwk_auth::keysource::{FixedKeySource, KeySetSource};
use jwk_auth::{Auth0Verifier, VerifierConfig};
use serde_json::{Value, json};

pub const DOMAIN: &str = "example.auth0.com";
pub const AUDIENCE: &str = "https://api.example.com";
pub const ISSUER: &str = "https://example.auth0.com/";


/// Returns the private half of test key `n` (1 or 2).
pub fn encoding_key(n: u8) -> EncodingKey {
    let pem: &str = match n {
        1 => include_str!("../fixtures/rsa_private_1.pem"),
        2 => include_str!("../fixtures/rsa_private_2.pem"),
        _ => panic!("No test key {n}"),
    };
    EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap()
}

/// Returns the public half of test key `n` (1 or 2) as a JWK, published under `test-key-{n}`.
pub fn public_jwk(n: u8) -> Value {
    let raw: &str = match n {
        1 => include_str!("../fixtures/rsa_public_1.jwk.json"),
        2 => include_str!("../fixtures/rsa_public_2.jwk.json"),
        _ => panic!("No test key {n}"),
    };
    serde_json::from_str(raw).unwrap()
}

/// Wraps JWKs into a key set document.
pub fn key_set_json(keys: &[Value]) -> Value { json!({ "keys": keys }) }

/// Wraps JWKs into a key set.
pub fn key_set(keys: &[Value]) -> JwkSet { serde_json::from_value(key_set_json(keys)).unwrap() }

pub fn now() -> i64 { jsonwebtoken::get_current_timestamp() as i64 }

/// Claims that pass every check of a verifier built by [`verifier()`].
pub fn valid_claims() -> Value {
    let now = now();
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "azp": "client1",
        "scope": "read write",
    })
}

/// Signs the claims with the given algorithm and test key.
pub fn sign_with(claims: &Value, alg: Algorithm, kid: Option<&str>, key: &EncodingKey) -> String {
    let mut header = Header::new(alg);
    header.kid = kid.map(String::from);
    jsonwebtoken::encode(&header, claims, key).unwrap()
}

/// Signs the claims with RS256 and test key 1, under its published ID.
pub fn sign(claims: &Value) -> String { sign_with(claims, Algorithm::RS256, Some("test-key-1"), &encoding_key(1)) }

pub fn config() -> VerifierConfig { VerifierConfig::new(DOMAIN, AUDIENCE).unwrap() }

/// A verifier for [`DOMAIN`] and [`AUDIENCE`] that only knows test key 1.
pub fn verifier() -> Auth0Verifier<JwksResolver<FixedKeySource>> {
    Auth0Verifier::new(config(), JwksResolver::new(FixedKeySource::new(key_set(&[public_jwk(1)]))))
}



/// Serves a fixed key set slowly, counting how often it is asked to.
#[derive(Clone)]
pub struct CountingSource {
    keys:    JwkSet,
    fetches: Arc<AtomicUsize>,
    delay:   Duration,
}
impl CountingSource {
    pub fn new(keys: JwkSet, delay: Duration) -> Self { Self { keys, fetches: Arc::new(AtomicUsize::new(0)), delay } }

    pub fn fetches(&self) -> usize { self.fetches.load(Ordering::SeqCst) }
}
impl KeySetSource for CountingSource {
    type Error = Infallible;

    fn fetch(&self) -> impl Send + Future<Output = Result<JwkSet, Self::Error>> {
        let keys = self.keys.clone();
        let fetches = self.fetches.clone();
        let delay = self.delay;
        async move {
            fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Ok(keys)
        }
    }
}
