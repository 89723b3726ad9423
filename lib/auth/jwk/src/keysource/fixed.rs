//  FIXED.rs
//    by Lut99
//
//  Created:
//    23 Oct 2024, 11:16:54
//  Last edited:
//    18 Oct 2026, 12:14:50
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements a [`KeySetSource`] that serves a key set known in advance.
//

use std::convert::Infallible;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use jsonwebtoken::jwk::JwkSet;
use thiserror::Error;
use tracing::debug;

use super::KeySetSource;


/***** ERRORS *****/
/// Defines the errors that occur when loading a [`FixedKeySource`].
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to deserialize the key set.
    #[error("Failed to deserialize key set")]
    Deserialize {
        #[source]
        err: serde_json::Error,
    },
    /// Failed to deserialize the key set file.
    #[error("Failed to deserialize key set file {:?}", path.display())]
    FileDeserialize {
        path: PathBuf,
        #[source]
        err:  serde_json::Error,
    },
    /// Failed to read the key set to memory.
    #[error("Failed to read key set file {:?}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        err:  std::io::Error,
    },
}





/***** LIBRARY *****/
/// Serves the same key set on every fetch.
///
/// Useful for testing, or for deployments that pin the issuer's keys instead of downloading them.
#[derive(Clone, Debug)]
pub struct FixedKeySource {
    keys: JwkSet,
}
impl FixedKeySource {
    /// Constructor for the FixedKeySource.
    ///
    /// # Arguments
    /// - `keys`: The [`JwkSet`] to serve.
    ///
    /// # Returns
    /// A new FixedKeySource.
    #[inline]
    pub fn new(keys: JwkSet) -> Self { Self { keys } }

    /// Constructor for the FixedKeySource that parses a key set document.
    ///
    /// # Arguments
    /// - `raw`: The JSON key set document (`{ "keys": [...] }`).
    ///
    /// # Errors
    /// This function errors if the document wasn't a valid key set.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let keys: JwkSet = serde_json::from_str(raw).map_err(|err| Error::Deserialize { err })?;
        Ok(Self { keys })
    }

    /// Constructor for the FixedKeySource that reads a key set document from disk.
    ///
    /// # Arguments
    /// - `path`: The path where the key set is stored on disk.
    ///
    /// # Errors
    /// This function can fail if it failed to read the file (e.g., it does not exist) or if it
    /// wasn't parsable as a JSON key set.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path: &Path = path.as_ref();
        let r = fs::read_to_string(path).map_err(|err| Error::FileRead { path: path.into(), err })?;
        let keys: JwkSet = serde_json::from_str(&r).map_err(|err| Error::FileDeserialize { path: path.into(), err })?;
        debug!("Loaded {} key(s) from {:?}", keys.keys.len(), path.display());
        Ok(Self { keys })
    }
}
impl KeySetSource for FixedKeySource {
    type Error = Infallible;

    #[inline]
    fn fetch(&self) -> impl Send + Future<Output = Result<JwkSet, Self::Error>> {
        let keys: JwkSet = self.keys.clone();
        async move { Ok(keys) }
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: &str = r#"{
        "keys": [
            { "kty": "RSA", "kid": "key1", "use": "sig", "alg": "RS256", "n": "AQAB", "e": "AQAB" }
        ]
    }"#;

    #[tokio::test]
    async fn test_serves_parsed_keys() {
        let source = FixedKeySource::from_json(KEYS).unwrap();
        let keys = source.fetch().await.unwrap();
        assert!(keys.find("key1").is_some());
        assert!(keys.find("key2").is_none());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(FixedKeySource::from_json("{\"nope\": 1}"), Err(Error::Deserialize { .. })));
        assert!(matches!(FixedKeySource::from_path("/definitely/not/here.json"), Err(Error::FileRead { .. })));
    }
}
