use anyhow::Result;
use apigw_sign_aws_v4::{RequestSigner, ResponseCredentialProvider};
use apigw_sign_core::time::parse_iso8601;
use apigw_sign_core::{Context, RequestDescriptor, Signer};
use bytes::Bytes;
use http::{Method, Response, StatusCode};
use pretty_assertions::assert_eq;

const LOGIN_RESPONSE: &str = r#"{
    "user": {"id": 42},
    "credential": {
        "AccessKeyId": "AKIDEXAMPLE",
        "SecretKey": "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
        "SessionToken": "session-token"
    }
}"#;

fn builder() -> Result<RequestSigner> {
    Ok(RequestSigner::new("execute-api", "ap-northeast-1")
        .with_host("api.example.com")
        .with_time(parse_iso8601("20240315T123045Z")?))
}

#[tokio::test]
async fn test_signer_with_login_response() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let resp = Response::builder()
        .status(StatusCode::OK)
        .body(Bytes::from_static(LOGIN_RESPONSE.as_bytes()))?;
    let signer = Signer::new(
        Context::new(),
        ResponseCredentialProvider::from_response(&resp),
        builder()?,
    );

    let mut req = RequestDescriptor::new(Method::GET, "/v1/profile");
    signer.sign(&mut req).await?;

    assert_eq!(req.headers.get("x-amz-security-token"), Some("session-token"));
    assert!(req
        .headers
        .get("authorization")
        .is_some_and(|v| v.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/")));
    Ok(())
}

#[tokio::test]
async fn test_signer_with_failed_login_response() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let resp = Response::builder()
        .status(StatusCode::FORBIDDEN)
        .body(Bytes::from_static(LOGIN_RESPONSE.as_bytes()))?;
    let signer = Signer::new(
        Context::new(),
        ResponseCredentialProvider::from_response(&resp),
        builder()?,
    );

    let mut req = RequestDescriptor::new(Method::GET, "/v1/profile");
    signer.sign(&mut req).await?;

    assert!(!req.headers.contains("x-amz-security-token"));
    assert!(req
        .headers
        .get("authorization")
        .is_some_and(|v| v.starts_with("AWS4-HMAC-SHA256 Credential=/")));
    Ok(())
}
