use super::{init_signing_test, sign_http_request, time, ACCESS_KEY, SECRET_KEY};
use anyhow::Result;
use apigw_sign_aws_v4::{Config, Credential, HostFallback, HostResolver, RequestSigner};
use apigw_sign_core::{ErrorKind, QueryParam, RequestDescriptor};
use http::{Method, Request};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pretty_assertions::assert_eq;

const DEV_HOST: &str = "dev-api-id.execute-api.ap-northeast-1.amazonaws.com";

fn resolver() -> HostResolver {
    HostResolver::new()
        .with_mapping("https://dev.example.com", DEV_HOST)
        .with_mapping(
            "https://prod.example.com",
            "prod-api-id.execute-api.ap-northeast-1.amazonaws.com",
        )
}

fn config(base_url: &str) -> Config {
    Config {
        base_url: Some(base_url.to_string()),
        ..Default::default()
    }
    .with_host_resolver(resolver())
}

#[test]
fn test_custom_domain_with_special_characters() -> Result<()> {
    init_signing_test();

    let signer = RequestSigner::from_config(&config("https://dev.example.com/"))?
        .with_time(time("20240315T123045Z"));
    let req = Request::builder()
        .method(Method::GET)
        .uri("https://dev.example.com/v1/users/%E6%97%A5%E6%9C%AC/a+b?tag=a+b&~k=1&%C3%A9=2")
        .body(String::new())?;

    let req = sign_http_request(&signer, req, &Credential::new(ACCESS_KEY, SECRET_KEY))?;

    // Sent to the custom domain, signed for the gateway.
    assert_eq!(req.uri().host(), Some("dev.example.com"));
    assert_eq!(req.headers()["host"], DEV_HOST);
    assert_eq!(
        req.headers()["authorization"],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240315/ap-northeast-1/execute-api/aws4_request, SignedHeaders=host;x-amz-date, Signature=86d7f5ef38a329e8a2026add1bcfc23e468fb922dc138932f1c754a390863598"
    );
    Ok(())
}

#[test]
fn test_unmapped_base_url() -> Result<()> {
    init_signing_test();

    let err = RequestSigner::from_config(&config("https://unknown.example.com"))
        .expect_err("unmapped base url must be rejected");
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

    let cfg = config("https://unknown.example.com")
        .with_host_resolver(resolver().with_fallback(HostFallback::First));
    let signer = RequestSigner::from_config(&cfg)?.with_time(time("20240315T123045Z"));

    let mut req = RequestDescriptor::new(Method::GET, "/items");
    signer.sign(&mut req, &Credential::new(ACCESS_KEY, SECRET_KEY))?;
    assert_eq!(req.headers.get("host"), Some(DEV_HOST));
    Ok(())
}

#[test]
fn test_encoded_path_is_not_encoded_twice() -> Result<()> {
    init_signing_test();

    let name = "!@#$%^&*()_+-=;:'><,?.txt";
    let signer = RequestSigner::new("execute-api", "ap-northeast-1")
        .with_host(DEV_HOST)
        .with_time(time("20240315T123045Z"));
    let cred = Credential::new(ACCESS_KEY, SECRET_KEY);

    let mut raw = RequestDescriptor::new(Method::HEAD, format!("/files/{name}"));
    let mut encoded = RequestDescriptor::new(
        Method::HEAD,
        format!("/files/{}", utf8_percent_encode(name, NON_ALPHANUMERIC)),
    );

    let a = signer.sign(&mut raw, &cred)?;
    let b = signer.sign(&mut encoded, &cred)?;

    assert_eq!(
        a.canonical.canonical_uri,
        "/files/%21%40%23%24%25%5E%26%2A%28%29_%2B-%3D%3B%3A%27%3E%3C%2C%3F.txt"
    );
    assert_eq!(a.signature, b.signature);
    Ok(())
}

#[test]
fn test_disabled_query_is_neither_signed_nor_sent() -> Result<()> {
    init_signing_test();

    let signer = RequestSigner::new("execute-api", "ap-northeast-1")
        .with_host(DEV_HOST)
        .with_time(time("20240315T123045Z"));
    let cred = Credential::new(ACCESS_KEY, SECRET_KEY);

    let mut with_disabled = RequestDescriptor::new(Method::GET, "/items")
        .with_query(QueryParam::new("page", "2"))
        .with_query(QueryParam::new("debug", "true").disable());
    let mut without = RequestDescriptor::new(Method::GET, "/items")
        .with_query(QueryParam::new("page", "2"));

    let a = signer.sign(&mut with_disabled, &cred)?;
    let b = signer.sign(&mut without, &cred)?;
    assert_eq!(a.canonical.canonical_query, "page=2");
    assert_eq!(a.signature, b.signature);

    let (mut parts, _) = Request::new(()).into_parts();
    with_disabled.apply(&mut parts)?;
    assert_eq!(parts.uri, "/items?page=2");
    Ok(())
}
