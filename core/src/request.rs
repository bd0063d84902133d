use std::mem;
use std::str::FromStr;

use bytes::Bytes;
use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;
use percent_encoding::utf8_percent_encode;

use crate::utils::{encode_path, UNRESERVED_ENCODE_SET};
use crate::Error;
use crate::Result;

/// A single query parameter of a request.
///
/// `value` is `None` for a bare key like `?flag`, which canonicalizes the
/// same as an empty value. Disabled parameters are neither signed nor sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    /// Decoded parameter name.
    pub key: String,
    /// Decoded parameter value.
    pub value: Option<String>,
    /// Whether the parameter is switched off.
    pub disabled: bool,
}

impl QueryParam {
    /// Create an enabled parameter with a value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            disabled: false,
        }
    }

    /// Create an enabled parameter without a value.
    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            disabled: false,
        }
    }

    /// Mark this parameter as disabled.
    pub fn disable(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Ordered header collection with case-insensitive identity.
///
/// Names keep the case they were inserted with so they can be transmitted
/// as-is, while lookups and [`HeaderList::upsert`] ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    /// Create an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the first value of the header with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append a header without touching existing entries of the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Replace the header if present, else append it.
    ///
    /// The first case-insensitive match takes the new name and value in
    /// place; any later duplicates are removed.
    pub fn upsert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(idx) => {
                let mut seen = 0;
                self.0.retain(|(k, _)| {
                    if !k.eq_ignore_ascii_case(&name) {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
                self.0[idx] = (name, value);
            }
            None => self.0.push((name, value)),
        }
    }

    /// Remove all headers with the given name.
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Iterate headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of header entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderList {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Request to be signed.
///
/// Signers read method, path, query and body, and inject their headers via
/// [`HeaderList::upsert`].
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme of the network destination.
    pub scheme: Option<Scheme>,
    /// Network destination, which may differ from the host that is signed.
    pub authority: Option<Authority>,
    /// HTTP path as given by the caller, possibly percent encoded.
    pub path: String,
    /// Ordered query parameters, decoded.
    pub query: Vec<QueryParam>,
    /// HTTP headers.
    pub headers: HeaderList,
    /// Request body, `None` for bodiless requests.
    pub body: Option<Bytes>,
}

impl RequestDescriptor {
    /// Create a request without query, headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            scheme: None,
            authority: None,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderList::new(),
            body: None,
        }
    }

    /// Push a query parameter.
    pub fn with_query(mut self, param: QueryParam) -> Self {
        self.query.push(param);
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Iterate the query parameters that are not disabled.
    pub fn query_enabled(&self) -> impl Iterator<Item = &QueryParam> {
        self.query.iter().filter(|q| !q.disabled)
    }

    /// Build a request descriptor from http::request::Parts.
    ///
    /// The uri and headers are taken out of `parts` to avoid copy; they are
    /// returned by [`RequestDescriptor::apply`].
    pub fn from_parts(parts: &mut http::request::Parts, body: Option<Bytes>) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        let mut headers = HeaderList::new();
        for (k, v) in mem::take(&mut parts.headers).iter() {
            // Unsigned headers may carry utf-8 beyond visible ascii.
            let value = std::str::from_utf8(v.as_bytes()).map_err(|e| {
                Error::request_invalid(format!("header {k} is not valid utf-8")).with_source(e)
            })?;
            headers.append(k.as_str(), value);
        }

        Ok(RequestDescriptor {
            method: parts.method.clone(),
            scheme: uri.scheme,
            authority: uri.authority,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| QueryParam::new(k, v))
                        .collect()
                })
                .unwrap_or_default(),
            headers,
            body,
        })
    }

    /// Apply the request descriptor back to http::request::Parts.
    ///
    /// Only enabled query parameters are written to the uri.
    pub fn apply(self, parts: &mut http::request::Parts) -> Result<()> {
        // The path is sent in the same encoded form it is signed in.
        let paq = {
            let mut s = encode_path(&self.path)?;
            for (i, q) in self.query_enabled().enumerate() {
                s.push(if i == 0 { '?' } else { '&' });
                s.extend(utf8_percent_encode(&q.key, &UNRESERVED_ENCODE_SET));
                if let Some(v) = &q.value {
                    s.push('=');
                    s.extend(utf8_percent_encode(v, &UNRESERVED_ENCODE_SET));
                }
            }

            PathAndQuery::from_str(&s)?
        };

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (k, v) in self.headers.iter() {
            let name = HeaderName::from_bytes(k.as_bytes())?;
            let mut value = HeaderValue::from_bytes(v.as_bytes())?;
            if name == http::header::AUTHORIZATION || name.as_str() == "x-amz-security-token" {
                value.set_sensitive(true);
            }
            headers.append(name, value);
        }
        parts.headers = headers;
        parts.method = self.method;

        let mut uri_parts = mem::take(&mut parts.uri).into_parts();
        uri_parts.scheme = self.scheme;
        uri_parts.authority = self.authority;
        uri_parts.path_and_query = Some(paq);
        parts.uri = Uri::from_parts(uri_parts)?;

        Ok(())
    }
}
