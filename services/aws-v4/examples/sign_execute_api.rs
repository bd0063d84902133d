//! Sign a request to an API Gateway behind a custom domain and print the
//! signing material.
//!
//! ```shell
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... \
//! APIGW_SIGN_BASE_URL=https://dev.example.com \
//! RUST_LOG=apigw_sign::diagnostics=info \
//! cargo run --example sign_execute_api
//! ```

use anyhow::Result;
use apigw_sign_aws_v4::{
    Config, ConfigCredentialProvider, HostResolver, LogDiagnostics, RequestSigner,
};
use apigw_sign_core::{Context, OsEnv, RequestDescriptor, Signer};
use http::Request;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let ctx = Context::new().with_env(OsEnv);
    let config = Config::default().from_env(&ctx).with_host_resolver(
        HostResolver::new()
            .with_mapping(
                "https://dev.example.com",
                "dev-api-id.execute-api.ap-northeast-1.amazonaws.com",
            )
            .with_mapping(
                "https://prod.example.com",
                "prod-api-id.execute-api.ap-northeast-1.amazonaws.com",
            ),
    );
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| "https://dev.example.com".to_string());
    let config = Config {
        base_url: Some(base_url.clone()),
        ..config
    };

    let builder = RequestSigner::from_config(&config)?.with_diagnostics(LogDiagnostics);
    let signer = Signer::new(ctx, ConfigCredentialProvider::new(config), builder);

    let req = Request::post(format!("{base_url}/v1/orders?dryRun=true"))
        .header("content-type", "application/json")
        .body(r#"{"name":"widget"}"#.to_string())?;

    let (mut parts, body) = req.into_parts();
    let mut desc = RequestDescriptor::from_parts(&mut parts, Some(body.clone().into()))?;
    signer.sign(&mut desc).await?;
    desc.apply(&mut parts)?;

    let req = Request::from_parts(parts, body);
    println!("{} {}", req.method(), req.uri());
    for (name, value) in req.headers() {
        println!("{name}: {value:?}");
    }
    Ok(())
}
