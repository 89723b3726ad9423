//  JWKS.rs
//    by Lut99
//
//  Created:
//    23 Oct 2024, 11:16:54
//  Last edited:
//    18 Oct 2026, 14:26:37
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements a resolver that looks up keys by ID in a cached copy of
//!   the issuer's JSON Web Key Set.
//

use std::collections::HashMap;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use jsonwebtoken::Header;
use jsonwebtoken::jwk::{Jwk, JwkSet, PublicKeyUse};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{Instrument as _, Level, debug, info, span, warn};

use super::{KeyResolver, SigningKey};
use crate::keysource::KeySetSource;


/***** CONSTANTS *****/
/// How long a fetched key set is used before it is fetched again.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
/// How old a key set must be before an unknown key ID may trigger a refresh.
pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(5);
/// How long a single fetch may take before it is abandoned.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);





/***** ERRORS *****/
/// Defines the errors originating from the [`JwksResolver`] which are the server's fault.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The key set source failed.
    #[error("Failed to fetch key set")]
    Fetch {
        #[source]
        err: Box<dyn 'static + Send + Sync + Error>,
    },
    /// The key set source took too long.
    #[error("Timed out fetching key set after {timeout:?}")]
    FetchTimeout { timeout: Duration },
    /// The published key was not usable for verification.
    #[error("Key {kid:?} in key set cannot be used for signature verification")]
    KeyMaterial {
        kid: String,
        #[source]
        err: jsonwebtoken::errors::Error,
    },
}

/// Defines the errors originating from the [`JwksResolver`] which are the client's fault.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing Key ID field in the JWT header.
    #[error("Missing key ID field in given JWT header")]
    HeaderKidNotFound,
    /// The suggested key ID wasn't found in the key set, even after refreshing.
    #[error("Unknown key with ID {kid:?}")]
    UnknownKeyId { kid: String },
}





/***** HELPERS *****/
/// A key set as fetched at some point in time.
#[derive(Debug)]
struct CachedKeySet {
    /// Increments with every fetch, so waiters can tell whether someone else refreshed.
    generation: u64,
    /// When this set was fetched.
    fetched_at: Instant,
    /// The signing keys in the set, by ID.
    by_kid: HashMap<String, Jwk>,
}
impl CachedKeySet {
    fn new(generation: u64, keys: JwkSet) -> Self {
        let mut by_kid: HashMap<String, Jwk> = HashMap::with_capacity(keys.keys.len());
        for jwk in keys.keys {
            let kid: String = match &jwk.common.key_id {
                Some(kid) => kid.clone(),
                None => {
                    debug!("Skipping key without key ID");
                    continue;
                },
            };
            if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
                debug!("Skipping encryption key {kid:?}");
                continue;
            }
            if by_kid.insert(kid.clone(), jwk).is_some() {
                warn!("Key set publishes key ID {kid:?} more than once; using the last one");
            }
        }
        Self { generation, fetched_at: Instant::now(), by_kid }
    }

    #[inline]
    fn is_fresh(&self, ttl: Duration) -> bool { self.fetched_at.elapsed() < ttl }

    #[inline]
    fn get(&self, kid: &str) -> Option<&Jwk> { self.by_kid.get(kid) }
}





/***** LIBRARY *****/
/// Resolves keys for the JWT by ID, using a lazily fetched and cached key set.
///
/// The key set is fetched on first use, then reused until [`JwksResolver::with_ttl()`] passes.
/// An unknown key ID triggers (at most) one refresh, in case the issuer rotated its keys.
/// Fetches are serialized, so concurrent resolves on an empty or stale cache cause only a single
/// fetch between them.
#[derive(Debug)]
pub struct JwksResolver<S> {
    /// Where we get the key set from.
    source: S,
    /// How long a key set is considered fresh.
    ttl: Duration,
    /// How old a key set must be before an unknown key ID may refresh it.
    refresh_cooldown: Duration,
    /// How long a fetch may take.
    fetch_timeout: Duration,
    /// The current key set, if any.
    cache: RwLock<Option<Arc<CachedKeySet>>>,
    /// Held by whoever is fetching.
    fetch_lock: Mutex<()>,
    /// The number of fetches started so far.
    generations: AtomicU64,
}
impl<S> JwksResolver<S> {
    /// Constructor for the JwksResolver.
    ///
    /// # Arguments
    /// - `source`: The [`KeySetSource`] that provides the issuer's key set.
    ///
    /// # Returns
    /// A new JwksResolver with an empty cache. Nothing is fetched until the first resolve.
    #[inline]
    pub fn new(source: S) -> Self {
        Self {
            source,
            ttl: DEFAULT_TTL,
            refresh_cooldown: DEFAULT_REFRESH_COOLDOWN,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            cache: RwLock::new(None),
            fetch_lock: Mutex::new(()),
            generations: AtomicU64::new(0),
        }
    }

    /// Sets how long a fetched key set is used before it is fetched again.
    #[inline]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets how old the key set must be before an unknown key ID may trigger a refresh.
    ///
    /// This bounds how often tokens with made-up key IDs can make us hit the issuer.
    #[inline]
    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = cooldown;
        self
    }

    /// Sets how long a single fetch may take before it counts as failed.
    #[inline]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// The source we fetch from.
    #[inline]
    pub fn source(&self) -> &S { &self.source }

    /// Drops the cached key set, so the next resolve fetches a new one.
    pub async fn invalidate(&self) {
        debug!("Invalidating cached key set");
        *self.cache.write().await = None;
    }
}
impl<S: KeySetSource> JwksResolver<S> {
    /// Fetches a new key set and caches it.
    ///
    /// Must only be called while holding `fetch_lock`.
    async fn fetch_locked(&self) -> Result<Arc<CachedKeySet>, ServerError> {
        let generation: u64 = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Fetching key set (generation {generation})...");
        let keys: JwkSet = match tokio::time::timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(Ok(keys)) => keys,
            Ok(Err(err)) => return Err(ServerError::Fetch { err: Box::new(err) }),
            Err(_) => return Err(ServerError::FetchTimeout { timeout: self.fetch_timeout }),
        };

        let cached = Arc::new(CachedKeySet::new(generation, keys));
        debug!("Caching {} signing key(s) (generation {generation})", cached.by_kid.len());
        *self.cache.write().await = Some(cached.clone());
        Ok(cached)
    }

    /// Returns the cached key set if it is fresh, fetching it otherwise.
    async fn current(&self) -> Result<Arc<CachedKeySet>, ServerError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.is_fresh(self.ttl) {
                return Ok(cached.clone());
            }
        }

        let _guard = self.fetch_lock.lock().await;
        // Somebody may have fetched while we were waiting for the lock
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.is_fresh(self.ttl) {
                return Ok(cached.clone());
            }
        }
        self.fetch_locked().await
    }

    /// Refreshes the key set because `seen` didn't have the key we were looking for.
    ///
    /// # Returns
    /// A newer key set, or [`None`] if `seen` is too young to be refreshed.
    async fn refresh_after(&self, seen: &CachedKeySet) -> Result<Option<Arc<CachedKeySet>>, ServerError> {
        let _guard = self.fetch_lock.lock().await;
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.generation != seen.generation {
                debug!("Key set was refreshed while waiting (generation {} -> {})", seen.generation, cached.generation);
                return Ok(Some(cached.clone()));
            }
            if cached.fetched_at.elapsed() < self.refresh_cooldown {
                debug!("Not refreshing key set fetched {:?} ago", cached.fetched_at.elapsed());
                return Ok(None);
            }
        }
        self.fetch_locked().await.map(Some)
    }
}
impl<S> KeyResolver for JwksResolver<S>
where
    S: Send + Sync + KeySetSource,
{
    type ClientError = ClientError;
    type ServerError = ServerError;


    fn resolve_key(&self, header: &Header) -> impl Send + Future<Output = Result<Result<SigningKey, Self::ClientError>, Self::ServerError>> {
        let kid: Option<String> = header.kid.clone();
        async move {
            // Unpack the key ID in the header
            let kid: String = match kid {
                Some(kid) => kid,
                None => return Ok(Err(ClientError::HeaderKidNotFound)),
            };

            // Get the key, refreshing once if we don't know it
            debug!("Finding key with ID {kid:?}...");
            let mut keys: Arc<CachedKeySet> = self.current().await?;
            if keys.get(&kid).is_none() {
                debug!("Key ID {kid:?} not in key set; refreshing");
                keys = match self.refresh_after(&keys).await? {
                    Some(keys) => keys,
                    None => return Ok(Err(ClientError::UnknownKeyId { kid })),
                };
            }
            let jwk: &Jwk = match keys.get(&kid) {
                Some(jwk) => jwk,
                None => return Ok(Err(ClientError::UnknownKeyId { kid })),
            };
            debug!("Key ID {kid:?}: {:?}", jwk.common.key_algorithm);

            // Now return that as a signing key
            match SigningKey::from_jwk(kid.as_str(), jwk) {
                Ok(key) => Ok(Ok(key)),
                Err(err) => Err(ServerError::KeyMaterial { kid, err }),
            }
        }
        .instrument(span!(Level::INFO, "JwksResolver::resolve_key"))
    }
}





/***** TESTS *****/
