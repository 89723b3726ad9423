//  CONFIG.rs
//    by Lut99
//
//  Created:
//    18 Oct 2026, 11:10:12
//  Last edited:
//    18 Oct 2026, 13:41:08
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the (construction-time) configuration of the
//!   [`Auth0Verifier`](crate::Auth0Verifier).
//

use std::env::{self, VarError};
use std::str::FromStr as _;

use jsonwebtoken::Algorithm;
use thiserror::Error;


/***** CONSTANTS *****/
/// The environment variable naming the issuer's domain.
pub const DOMAIN_VAR: &str = "AUTH0_DOMAIN";
/// The environment variable naming the expected audience.
pub const AUDIENCE_VAR: &str = "AUTH0_AUDIENCE";
/// The environment variable listing the accepted algorithms, comma-separated.
pub const ALGORITHMS_VAR: &str = "AUTH0_ALGORITHMS";

/// The algorithms accepted when nothing else is configured.
pub const DEFAULT_ALGORITHMS: &[Algorithm] = &[Algorithm::RS256];
/// The default clock skew tolerated on `exp` and `iat`, in seconds.
pub const DEFAULT_LEEWAY: u64 = 60;





/***** ERRORS *****/
/// Defines errors that occur when building a [`VerifierConfig`].
///
/// These are the only errors that ever escape to users of this crate; they are meant to stop a
/// server at startup, not to reject requests.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The algorithm allow-list was empty.
    #[error("No signing algorithms given; at least one must be allowed")]
    AlgorithmsEmpty,
    /// An algorithm in the allow-list was symmetric.
    #[error("Symmetric algorithm {alg:?} cannot be used to verify tokens against a published key set")]
    AlgorithmSymmetric { alg: Algorithm },
    /// An algorithm in the allow-list wasn't recognised.
    #[error("Unknown signing algorithm {raw:?}")]
    AlgorithmUnknown {
        raw: String,
        #[source]
        err: jsonwebtoken::errors::Error,
    },
    /// The audience was empty.
    #[error("Audience must be non-empty")]
    AudienceEmpty,
    /// The domain was empty.
    #[error("Issuer domain must be non-empty")]
    DomainEmpty,
    /// The domain looked like a URL instead of a bare host.
    #[error("Issuer domain {domain:?} must be a bare host (e.g., \"example.auth0.com\"), not a URL")]
    DomainNotHost { domain: String },
    /// Failed to build the HTTP client used to download the key set.
    #[cfg(feature = "http")]
    #[error("Failed to build HTTP client for the key set endpoint")]
    HttpClient {
        #[source]
        err: reqwest::Error,
    },
    /// A required environment variable wasn't given.
    #[error("{name} environment variable is required")]
    VarMissing { name: &'static str },
    /// An environment variable wasn't valid Unicode.
    #[error("{name} environment variable is not valid UTF-8")]
    VarNonUnicode { name: &'static str },
}





/***** HELPER FUNCTIONS *****/
/// Parses a list of algorithm names into an allow-list.
///
/// # Errors
/// This function errors if the list is empty, if any name is unknown, or if any algorithm is
/// symmetric.
fn parse_algorithms<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algs: Vec<Algorithm> = Vec::new();
    for name in names {
        let name: &str = name.as_ref().trim();
        let alg = Algorithm::from_str(name).map_err(|err| ConfigError::AlgorithmUnknown { raw: name.into(), err })?;
        if matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ConfigError::AlgorithmSymmetric { alg });
        }
        if !algs.contains(&alg) {
            algs.push(alg);
        }
    }
    if algs.is_empty() {
        return Err(ConfigError::AlgorithmsEmpty);
    }
    Ok(algs)
}

/// Reads an environment variable, treating unset and empty the same.
fn read_var(name: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::VarNonUnicode { name }),
    }
}





/***** LIBRARY *****/
/// Describes which tokens an [`Auth0Verifier`](crate::Auth0Verifier) accepts.
///
/// Constructed once and never reloaded.
#[derive(Clone, Debug)]
pub struct VerifierConfig {
    /// The issuer's domain, e.g., `example.auth0.com`.
    domain:     String,
    /// The audience that tokens must be issued for.
    audience:   String,
    /// The only algorithms that we accept signatures in.
    algorithms: Vec<Algorithm>,
    /// The clock skew tolerated on time-based claims, in seconds.
    leeway:     u64,
}
impl VerifierConfig {
    /// Constructor for the VerifierConfig that only accepts [`DEFAULT_ALGORITHMS`].
    ///
    /// # Arguments
    /// - `domain`: The issuer domain (a bare host like `example.auth0.com`).
    /// - `audience`: The audience (API identifier) tokens must be issued for.
    ///
    /// # Returns
    /// A new VerifierConfig.
    ///
    /// # Errors
    /// This function errors if either the domain or audience is empty, or if the domain is not a
    /// bare host.
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Result<Self, ConfigError> {
        let domain: String = domain.into().trim().to_string();
        let audience: String = audience.into().trim().to_string();
        if domain.is_empty() {
            return Err(ConfigError::DomainEmpty);
        }
        if domain.contains("://") || domain.contains('/') {
            return Err(ConfigError::DomainNotHost { domain });
        }
        if audience.is_empty() {
            return Err(ConfigError::AudienceEmpty);
        }
        Ok(Self { domain, audience, algorithms: DEFAULT_ALGORITHMS.to_vec(), leeway: DEFAULT_LEEWAY })
    }

    /// Reads the configuration from the environment.
    ///
    /// Uses [`DOMAIN_VAR`] and [`AUDIENCE_VAR`] (both required), plus [`ALGORITHMS_VAR`] as a
    /// comma-separated list (defaults to [`DEFAULT_ALGORITHMS`]).
    ///
    /// # Errors
    /// This function errors if a required variable is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let domain: String = read_var(DOMAIN_VAR)?.ok_or(ConfigError::VarMissing { name: DOMAIN_VAR })?;
        let audience: String = read_var(AUDIENCE_VAR)?.ok_or(ConfigError::VarMissing { name: AUDIENCE_VAR })?;
        let config = Self::new(domain, audience)?;
        match read_var(ALGORITHMS_VAR)? {
            Some(algs) => config.with_algorithms(algs.split(',')),
            None => Ok(config),
        }
    }

    /// Replaces the algorithm allow-list.
    ///
    /// # Arguments
    /// - `algorithms`: The names of the algorithms to accept, e.g., `["RS256", "ES256"]`.
    ///
    /// # Errors
    /// This function errors if the list is empty, names an unknown algorithm or names a
    /// symmetric (`HS*`) one.
    pub fn with_algorithms<S: AsRef<str>>(mut self, algorithms: impl IntoIterator<Item = S>) -> Result<Self, ConfigError> {
        self.algorithms = parse_algorithms(algorithms)?;
        Ok(self)
    }

    /// Replaces the tolerated clock skew.
    #[inline]
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    /// The issuer's domain.
    #[inline]
    pub fn domain(&self) -> &str { &self.domain }

    /// The audience tokens must be issued for.
    #[inline]
    pub fn audience(&self) -> &str { &self.audience }

    /// The allow-list of signing algorithms.
    #[inline]
    pub fn algorithms(&self) -> &[Algorithm] { &self.algorithms }

    /// The tolerated clock skew, in seconds.
    #[inline]
    pub fn leeway(&self) -> u64 { self.leeway }

    /// The value the `iss` claim must have.
    #[inline]
    pub fn issuer(&self) -> String { format!("https://{}/", self.domain) }

    /// Where the issuer publishes its key set.
    #[inline]
    pub fn jwks_url(&self) -> String { format!("https://{}/.well-known/jwks.json", self.domain) }
}





/***** TESTS *****/
