use std::fmt;
use std::fmt::Write;

use apigw_sign_core::hash::hex_sha256;
use apigw_sign_core::utils::{encode_path, UNRESERVED_ENCODE_SET};
use apigw_sign_core::{Error, QueryParam, RequestDescriptor, Result};
use percent_encoding::utf8_percent_encode;

use crate::constants::{HOST, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN};

/// Canonical form of a request as defined by
/// [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request).
///
/// Always rebuilt per request, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// Uppercase HTTP method.
    pub method: String,
    /// Percent encoded path, always starting with `/`.
    pub canonical_uri: String,
    /// Sorted, encoded query string without disabled parameters.
    pub canonical_query: String,
    /// Signed headers block, every line newline terminated.
    pub canonical_headers: String,
    /// Signed header names joined with `;`.
    pub signed_headers: String,
    /// Hex encoded SHA256 of the body.
    pub payload_hash: String,
}

impl CanonicalRequest {
    /// Build the canonical form of `req` as signed for `host` at `amz_date`.
    pub fn build(
        req: &RequestDescriptor,
        host: &str,
        amz_date: &str,
        session_token: Option<&str>,
    ) -> Result<Self> {
        let (canonical_headers, signed_headers) =
            canonical_headers(host, amz_date, session_token)?;

        Ok(Self {
            method: req.method.as_str().to_ascii_uppercase(),
            canonical_uri: canonical_uri(&req.path)?,
            canonical_query: canonical_query(&req.query),
            canonical_headers,
            signed_headers,
            payload_hash: payload_hash(req.body.as_deref()),
        })
    }
}

impl fmt::Display for CanonicalRequest {
    /// The canonical headers block already ends with `\n`, so a blank line
    /// separates it from the signed headers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.canonical_uri)?;
        writeln!(f, "{}", self.canonical_query)?;
        writeln!(f, "{}", self.canonical_headers)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Build `(canonical_headers, signed_headers)` for the fixed signed header set.
///
/// Only `host`, `x-amz-date` and, with a non-empty token,
/// `x-amz-security-token` are signed. Other request headers never take part.
pub fn canonical_headers(
    host: &str,
    amz_date: &str,
    session_token: Option<&str>,
) -> Result<(String, String)> {
    let mut headers = vec![(HOST, host), (X_AMZ_DATE, amz_date)];
    if let Some(token) = session_token.filter(|v| !v.is_empty()) {
        headers.push((X_AMZ_SECURITY_TOKEN, token));
    }
    // Byte order, the names are already lowercase.
    headers.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    let mut canonical = String::with_capacity(128);
    for (k, v) in &headers {
        check_header_value(k, v)?;
        writeln!(canonical, "{k}:{v}")?;
    }
    let signed = headers
        .iter()
        .map(|(k, _)| *k)
        .collect::<Vec<_>>()
        .join(";");

    Ok((canonical, signed))
}

fn check_header_value(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::request_invalid(format!(
            "header {name} must not be empty"
        )));
    }
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(Error::request_invalid(format!(
            "header {name} contains control character {c:?}"
        )));
    }
    Ok(())
}

/// Build the canonical query string.
///
/// Disabled parameters are dropped, keys and values are encoded on their
/// own and pairs are sorted by encoded key, then encoded value.
pub fn canonical_query(query: &[QueryParam]) -> String {
    let mut pairs = query
        .iter()
        .filter(|q| !q.disabled)
        .map(|q| {
            (
                utf8_percent_encode(&q.key, &UNRESERVED_ENCODE_SET).to_string(),
                q.value
                    .as_deref()
                    .map(|v| utf8_percent_encode(v, &UNRESERVED_ENCODE_SET).to_string())
                    .unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>();
    pairs.sort_unstable();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the canonical uri.
///
/// Every segment is decoded, then encoded exactly once, so a path that is
/// already percent encoded is not encoded twice.
pub fn canonical_uri(path: &str) -> Result<String> {
    Ok(encode_path(path)?.replace('+', "%20"))
}

/// Hex encoded SHA256 of the body; an absent body hashes the empty string.
pub fn payload_hash(body: Option<&[u8]>) -> String {
    hex_sha256(body.unwrap_or_default())
}
