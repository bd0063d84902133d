use super::{init_signing_test, sign_http_request, time, ACCESS_KEY, SECRET_KEY};
use anyhow::Result;
use apigw_sign_aws_v4::{Config, ConfigCredentialProvider, Credential, RequestSigner};
use apigw_sign_core::{Context, QueryParam, RequestDescriptor, Signer};
use http::{Method, Request};
use pretty_assertions::assert_eq;

const GATEWAY_HOST: &str = "prod-api-id.execute-api.ap-northeast-1.amazonaws.com";

fn vanilla_signer() -> RequestSigner {
    RequestSigner::new("service", "us-east-1")
        .with_host("example.amazonaws.com")
        .with_time(time("20150830T123600Z"))
}

fn vanilla_credential() -> Credential {
    Credential::new(ACCESS_KEY, "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
}

fn orders_request() -> RequestDescriptor {
    RequestDescriptor::new(Method::POST, "v1/my path/orders")
        .with_query(QueryParam::new("b", "1"))
        .with_query(QueryParam::new("a", "2"))
        .with_query(QueryParam::new("limit", "0"))
        .with_query(QueryParam::flag("skip"))
        .with_query(QueryParam::new("debug", "true").disable())
        .with_query(QueryParam::new("q", "hello world"))
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"name":"widget"}"#)
}

fn orders_signer() -> RequestSigner {
    RequestSigner::new("execute-api", "ap-northeast-1")
        .with_host(GATEWAY_HOST)
        .with_time(time("20240315T123045Z"))
}

#[test]
fn test_get_vanilla() -> Result<()> {
    init_signing_test();

    let mut req = RequestDescriptor::new(Method::GET, "/");
    let material = vanilla_signer().sign(&mut req, &vanilla_credential())?;

    assert_eq!(
        material.canonical_request,
        "GET\n/\n\nhost:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\nhost;x-amz-date\ne3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        req.headers.get("authorization"),
        Some("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host;x-amz-date, Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31")
    );
    Ok(())
}

#[test]
fn test_get_vanilla_query_order() -> Result<()> {
    init_signing_test();

    let mut req = RequestDescriptor::new(Method::GET, "/")
        .with_query(QueryParam::new("Param2", "value2"))
        .with_query(QueryParam::new("Param1", "value1"));
    let material = vanilla_signer().sign(&mut req, &vanilla_credential())?;

    assert_eq!(material.canonical.canonical_query, "Param1=value1&Param2=value2");
    assert_eq!(
        material.signature,
        "b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500"
    );
    Ok(())
}

#[test]
fn test_post_with_query_and_body() -> Result<()> {
    init_signing_test();

    let mut req = orders_request();
    let material = orders_signer().sign(&mut req, &Credential::new(ACCESS_KEY, SECRET_KEY))?;

    assert_eq!(
        material.canonical_request,
        format!(
            "POST\n/v1/my%20path/orders\na=2&b=1&limit=0&q=hello%20world&skip=\nhost:{GATEWAY_HOST}\nx-amz-date:20240315T123045Z\n\nhost;x-amz-date\n256e2b36195d6c9d25b78bf0df70019cb60421b088cf96ca21e570fbfc34f6b2"
        )
    );
    assert_eq!(
        material.string_to_sign,
        "AWS4-HMAC-SHA256\n20240315T123045Z\n20240315/ap-northeast-1/execute-api/aws4_request\naa7d429de21a0b168cd2850dfeb655b8cde311b65bf2c287811ad534bcf56864"
    );
    assert_eq!(
        material.signature,
        "de768de6f5df4f625b20e80dc7ee9a08919446741b300cfc78f0340d501dd534"
    );

    // Unsigned headers pass through untouched.
    assert_eq!(req.headers.get("content-type"), Some("application/json"));
    assert_eq!(req.headers.get("host"), Some(GATEWAY_HOST));
    assert!(!req.headers.contains("x-amz-security-token"));
    Ok(())
}

#[test]
fn test_post_with_session_token() -> Result<()> {
    init_signing_test();

    let mut req = orders_request();
    let cred = Credential::new(ACCESS_KEY, SECRET_KEY).with_session_token("session-token");
    let material = orders_signer().sign(&mut req, &cred)?;

    assert_eq!(
        material.canonical.signed_headers,
        "host;x-amz-date;x-amz-security-token"
    );
    assert_eq!(
        material.signature,
        "24f77fcb57d3be356c4d1b1c4daf56ecbe6fc3264aea50b697ca1444970a4a5b"
    );
    assert_eq!(req.headers.get("x-amz-security-token"), Some("session-token"));
    Ok(())
}

#[test]
fn test_empty_session_token_is_absent() -> Result<()> {
    init_signing_test();

    let mut with_empty = orders_request();
    let mut without = orders_request();
    let signer = orders_signer();

    let a = signer.sign(
        &mut with_empty,
        &Credential::new(ACCESS_KEY, SECRET_KEY).with_session_token(""),
    )?;
    let b = signer.sign(&mut without, &Credential::new(ACCESS_KEY, SECRET_KEY))?;

    assert_eq!(a, b);
    assert!(!with_empty.headers.contains("x-amz-security-token"));
    Ok(())
}

#[test]
fn test_sign_http_request() -> Result<()> {
    init_signing_test();

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!(
            "https://{GATEWAY_HOST}/v1/my%20path/orders?b=1&a=2&limit=0&skip=&q=hello%20world"
        ))
        .header("content-type", "application/json")
        .body(r#"{"name":"widget"}"#.to_string())?;

    let req = sign_http_request(
        &RequestSigner::new("execute-api", "ap-northeast-1").with_time(time("20240315T123045Z")),
        req,
        &Credential::new(ACCESS_KEY, SECRET_KEY),
    )?;

    assert_eq!(req.headers()["host"], GATEWAY_HOST);
    assert_eq!(req.headers()["x-amz-date"], "20240315T123045Z");
    assert_eq!(
        req.headers()["authorization"],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240315/ap-northeast-1/execute-api/aws4_request, SignedHeaders=host;x-amz-date, Signature=de768de6f5df4f625b20e80dc7ee9a08919446741b300cfc78f0340d501dd534"
    );
    assert!(req.headers()["authorization"].is_sensitive());
    assert_eq!(req.uri().host(), Some(GATEWAY_HOST));
    Ok(())
}

#[test]
fn test_sent_request_matches_signed_request() -> Result<()> {
    init_signing_test();

    let mut req = orders_request();
    let material = orders_signer().sign(&mut req, &Credential::new(ACCESS_KEY, SECRET_KEY))?;

    let (mut parts, _) = Request::new(()).into_parts();
    req.apply(&mut parts)?;

    let sent = parts
        .uri
        .path_and_query()
        .expect("path must be set")
        .as_str()
        .to_string();
    assert_eq!(
        sent,
        "/v1/my%20path/orders?b=1&a=2&limit=0&skip&q=hello%20world"
    );
    assert!(sent.starts_with(&material.canonical.canonical_uri));
    assert!(!sent.contains("debug"));
    Ok(())
}

#[tokio::test]
async fn test_default_config_signs_host_header() -> Result<()> {
    init_signing_test();

    let config = Config::default();
    let signer = Signer::new(
        Context::new(),
        ConfigCredentialProvider::new(Config {
            access_key_id: Some(ACCESS_KEY.to_string()),
            secret_access_key: Some(SECRET_KEY.to_string()),
            ..Default::default()
        }),
        RequestSigner::from_config(&config)?.with_time(time("20240315T123045Z")),
    );

    let mut req = orders_request().with_header("host", GATEWAY_HOST);
    signer.sign(&mut req).await?;

    assert_eq!(
        req.headers.get("authorization"),
        Some("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240315/ap-northeast-1/execute-api/aws4_request, SignedHeaders=host;x-amz-date, Signature=de768de6f5df4f625b20e80dc7ee9a08919446741b300cfc78f0340d501dd534")
    );
    Ok(())
}
