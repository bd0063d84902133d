mod special_chars;
mod standard;

use anyhow::Result;
use apigw_sign_aws_v4::{Credential, RequestSigner};
use apigw_sign_core::time::{parse_iso8601, DateTime};
use apigw_sign_core::{Context, RequestDescriptor, SignRequest};
use bytes::Bytes;
use http::Request;
use log::debug;

pub const ACCESS_KEY: &str = "AKIDEXAMPLE";
pub const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";

/// Initialize test environment
pub fn init_signing_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn time(s: &str) -> DateTime {
    parse_iso8601(s).expect("time must be valid")
}

/// Sign an http request in place and return it with the injected headers.
pub fn sign_http_request(
    signer: &RequestSigner,
    req: Request<String>,
    cred: &Credential,
) -> Result<Request<String>> {
    let (mut parts, body) = req.into_parts();
    let payload = (!body.is_empty()).then(|| Bytes::from(body.clone()));

    let mut desc = RequestDescriptor::from_parts(&mut parts, payload)?;
    signer.sign_request(&Context::new(), &mut desc, Some(cred))?;
    desc.apply(&mut parts)?;

    let req = Request::from_parts(parts, body);
    debug!("signed request: {req:?}");
    Ok(req)
}
