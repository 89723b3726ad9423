//  BEARER.rs
//    by Lut99
//
//  Created:
//    23 Oct 2024, 10:37:53
//  Last edited:
//    18 Oct 2026, 10:44:17
//  Auto updated?
//    Yes
//
//  Description:
//!   Pulls bearer tokens out of HTTP `Authorization`-headers.
//

use http::header::{AUTHORIZATION, ToStrError};
use http::{HeaderMap, HeaderValue};
use thiserror::Error;


/***** ERRORS *****/
/// Defines what may go wrong when extracting a bearer token from a request.
#[derive(Debug, Error)]
pub enum BearerError {
    /// The given 'Authorization'-header did not contain valid UTF-8.
    #[error("Value of header {header:?} in request is non-UTF-8")]
    HeaderNonUtf8 {
        header: &'static str,
        #[source]
        err:    ToStrError,
    },
    /// No 'Authorization' header found in request.
    #[error("Missing header {header:?} in request")]
    HeaderNotFound { header: &'static str },
    /// The given 'Authorization'-header was missing the 'Bearer '-part.
    #[error("Missing \"Bearer \" in header {header:?} in request (raw value: {raw:?})")]
    MissingBearer { header: &'static str, raw: String },
    /// There was a 'Bearer ' but nothing after it.
    #[error("Empty bearer token in header {header:?} in request")]
    EmptyToken { header: &'static str },
}





/***** LIBRARY *****/
/// Given a (potentially present) `Authorization`-header value, attempts to extract the bearer
/// token from it.
///
/// The scheme is matched case-insensitively, as per RFC 7235.
///
/// # Arguments
/// - `name`: The name of the Authorization header. Only used for debugging in this function.
/// - `value`: The [`HeaderValue`] representing what is in the header (or [`None`]) if it isn't
///   present!).
///
/// # Returns
/// A [`str`] representation of the token.
///
/// # Errors
/// This function may error if the header isn't present, or doesn't bear a token (e.g., missing
/// "Bearer" in the token field).
pub fn extract_token<'h>(name: &'static str, value: Option<&'h HeaderValue>) -> Result<&'h str, BearerError> {
    // Get the header value as a string
    let header_val: &str = match value {
        Some(v) => v.to_str().map_err(|err| BearerError::HeaderNonUtf8 { header: name, err })?,
        None => return Err(BearerError::HeaderNotFound { header: name }),
    };

    // Split on the bearer thingy
    let token: &str = match header_val.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("Bearer ") => header_val[7..].trim(),
        _ => return Err(BearerError::MissingBearer { header: name, raw: header_val.into() }),
    };
    if token.is_empty() {
        return Err(BearerError::EmptyToken { header: name });
    }

    // OK, let's go
    Ok(token)
}

/// Extracts the bearer token from the standard `Authorization`-header in a [`HeaderMap`].
///
/// # Errors
/// See [`extract_token()`].
#[inline]
pub fn extract_from_headers(headers: &HeaderMap) -> Result<&str, BearerError> { extract_token(AUTHORIZATION.as_str(), headers.get(AUTHORIZATION)) }





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extracts_bearer() {
        assert_eq!(extract_from_headers(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(extract_from_headers(&headers("bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_rejects_missing_header() {
        assert!(matches!(extract_from_headers(&HeaderMap::new()), Err(BearerError::HeaderNotFound { .. })));
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(extract_from_headers(&headers("Basic dXNlcjpwYXNz")), Err(BearerError::MissingBearer { .. })));
        assert!(matches!(extract_from_headers(&headers("Bear")), Err(BearerError::MissingBearer { .. })));
    }

    #[test]
    fn test_rejects_empty_token() {
        assert!(matches!(extract_from_headers(&headers("Bearer    ")), Err(BearerError::EmptyToken { .. })));
    }
}
