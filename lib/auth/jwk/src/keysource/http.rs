//  HTTP.rs
//    by Lut99
//
//  Created:
//    18 Oct 2026, 11:48:03
//  Last edited:
//    18 Oct 2026, 12:40:36
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements a [`KeySetSource`] that downloads the key set from the
//!   issuer's well-known endpoint.
//

use std::future::Future;
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{Instrument as _, Level, debug, span};

use super::KeySetSource;


/***** CONSTANTS *****/
/// The default timeout for a single key set request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);





/***** ERRORS *****/
/// Defines the errors that occur when downloading a key set.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to build the HTTP client.
    #[error("Failed to build HTTP client")]
    ClientBuild {
        #[source]
        err: reqwest::Error,
    },
    /// The response body wasn't a key set.
    #[error("Failed to deserialize key set downloaded from {url:?}")]
    Deserialize {
        url: String,
        #[source]
        err: reqwest::Error,
    },
    /// The endpoint couldn't be reached (or timed out).
    #[error("Failed to send GET-request to {url:?}")]
    Request {
        url: String,
        #[source]
        err: reqwest::Error,
    },
    /// The endpoint responded with something other than success.
    #[error("GET-request to {url:?} failed with status {status}")]
    Status { url: String, status: StatusCode },
}





/***** LIBRARY *****/
/// Downloads the key set with an HTTP GET on every fetch.
#[derive(Clone, Debug)]
pub struct HttpKeySource {
    /// Where to download the key set from.
    url:    String,
    /// The client used to download it, with its timeout baked in.
    client: Client,
}
impl HttpKeySource {
    /// Constructor for the HttpKeySource with [`DEFAULT_TIMEOUT`].
    ///
    /// # Arguments
    /// - `url`: The address of the key set document, typically
    ///   `https://{domain}/.well-known/jwks.json`.
    ///
    /// # Errors
    /// This function errors if the HTTP client could not be built (e.g., no TLS backend).
    #[inline]
    pub fn new(url: impl Into<String>) -> Result<Self, Error> { Self::with_timeout(url, DEFAULT_TIMEOUT) }

    /// Constructor for the HttpKeySource with a custom request timeout.
    ///
    /// # Arguments
    /// - `url`: The address of the key set document.
    /// - `timeout`: The maximum time a single download may take, connecting included.
    ///
    /// # Errors
    /// This function errors if the HTTP client could not be built.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client: Client = Client::builder().timeout(timeout).build().map_err(|err| Error::ClientBuild { err })?;
        Ok(Self { url: url.into(), client })
    }

    /// Constructor for the HttpKeySource with a preconfigured client.
    #[inline]
    pub fn with_client(url: impl Into<String>, client: Client) -> Self { Self { url: url.into(), client } }

    /// The address we download from.
    #[inline]
    pub fn url(&self) -> &str { &self.url }
}
impl KeySetSource for HttpKeySource {
    type Error = Error;

    fn fetch(&self) -> impl Send + Future<Output = Result<JwkSet, Self::Error>> {
        async move {
            debug!("Downloading key set from {:?}...", self.url);
            let res = self.client.get(&self.url).send().await.map_err(|err| Error::Request { url: self.url.clone(), err })?;
            if !res.status().is_success() {
                return Err(Error::Status { url: self.url.clone(), status: res.status() });
            }
            let keys: JwkSet = res.json().await.map_err(|err| Error::Deserialize { url: self.url.clone(), err })?;
            debug!("Downloaded {} key(s) from {:?}", keys.keys.len(), self.url);
            Ok(keys)
        }
        .instrument(span!(Level::INFO, "HttpKeySource::fetch", url = %self.url))
    }
}
