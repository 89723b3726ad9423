//  MAIN.rs
//    by Lut99
//
//  Created:
//    11 Nov 2024, 12:20:52
//  Last edited:
//    18 Oct 2026, 16:05:19
//  Auto updated?
//    Yes
//
//  Description:
//!   Verifies a single access token against an Auth0 tenant and prints
//!   the resulting principal.
//

use std::path::PathBuf;

use auth0_verifier::auth::jwk::keyresolver::JwksResolver;
use auth0_verifier::auth::jwk::keysource::FixedKeySource;
use auth0_verifier::auth::jwk::{Auth0Verifier, ConfigError, VerifierConfig};
use auth0_verifier::spec::{Principal, TokenVerifier as _};
use clap::Parser;
use error_trace::trace;
use tracing::{Level, error, info};


/***** ARGUMENTS *****/
/// Defines the arguments for this binary.
#[derive(Debug, Parser)]
struct Arguments {
    /// Whether to enable INFO- and DEBUG-level logging.
    #[clap(long)]
    debug: bool,
    /// Whether to enable TRACE-level logging. Implies '--debug'.
    #[clap(long)]
    trace: bool,

    /// The Auth0 tenant domain that issued the token, e.g., `example.auth0.com`.
    #[clap(short, long, env = "AUTH0_DOMAIN")]
    domain:     String,
    /// The audience (API identifier) that the token must be issued for.
    #[clap(short, long, env = "AUTH0_AUDIENCE")]
    audience:   String,
    /// The signing algorithms to accept, comma-separated.
    #[clap(long, env = "AUTH0_ALGORITHMS", default_value = "RS256")]
    algorithms: String,
    /// If given, reads the key set from this file instead of downloading it from the tenant.
    #[clap(short, long)]
    keys:       Option<PathBuf>,

    /// The access token to verify.
    token: String,
}





/***** HELPERS *****/
/// Builds the configuration from the arguments.
fn config(args: &Arguments) -> Result<VerifierConfig, ConfigError> {
    VerifierConfig::new(&args.domain, &args.audience)?.with_algorithms(args.algorithms.split(','))
}

/// Prints the principal, or an access denied.
fn report(principal: Option<Principal>) {
    match principal {
        Some(principal) => match serde_json::to_string_pretty(&principal) {
            Ok(raw) => println!("{raw}"),
            Err(err) => {
                error!("{}", trace!(("Failed to serialize principal"), err));
                std::process::exit(1);
            },
        },
        None => {
            println!("Access denied (run with '--debug' to see why)");
            std::process::exit(1);
        },
    }
}





/***** ENTRYPOINT *****/
#[tokio::main]
async fn main() {
    // Parse the arguments
    let args = Arguments::parse();

    // Setup the logger
    tracing_subscriber::fmt()
        .with_max_level(if args.trace {
            Level::TRACE
        } else if args.debug {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();
    info!("{} - v{}", env!("CARGO_CRATE_NAME"), env!("CARGO_PKG_VERSION"));

    // Setup the verifier
    let config = match config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", trace!(("Invalid verifier configuration"), err));
            std::process::exit(1);
        },
    };
    info!("Verifying token for audience {:?} issued by {:?}", config.audience(), config.issuer());
    match &args.keys {
        Some(path) => {
            let source = match FixedKeySource::from_path(path) {
                Ok(source) => source,
                Err(err) => {
                    error!("{}", trace!(("Failed to load JWK keys from {:?}", path.display()), err));
                    std::process::exit(1);
                },
            };
            let verifier = Auth0Verifier::new(config, JwksResolver::new(source));
            report(verifier.verify(&args.token).await);
        },
        None => {
            let verifier = match Auth0Verifier::from_config(config) {
                Ok(verifier) => verifier,
                Err(err) => {
                    error!("{}", trace!(("Failed to create verifier"), err));
                    std::process::exit(1);
                },
            };
            report(verifier.verify(&args.token).await);
        },
    }
}
