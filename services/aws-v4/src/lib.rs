//! AWS SigV4 signer for API Gateway (`execute-api`) requests.
//!
//! This crate signs requests with the `AWS4-HMAC-SHA256` algorithm using a
//! fixed signed header set: `host`, `x-amz-date` and, when a session token is
//! present, `x-amz-security-token`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use apigw_sign_aws_v4::{Config, ConfigCredentialProvider, RequestSigner};
//! use apigw_sign_core::{Context, OsEnv, RequestDescriptor, Result, Signer};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new().with_env(OsEnv);
//!     let config = Config::default().from_env(&ctx);
//!
//!     let signer = Signer::new(
//!         ctx,
//!         ConfigCredentialProvider::new(config.clone()),
//!         RequestSigner::from_config(&config)?,
//!     );
//!
//!     let mut req = RequestDescriptor::new(http::Method::GET, "/items")
//!         .with_header("host", "api-id.execute-api.ap-northeast-1.amazonaws.com");
//!     signer.sign(&mut req).await?;
//!
//!     println!("{:?}", req.headers.get("authorization"));
//!     Ok(())
//! }
//! ```
//!
//! ## Custom domains
//!
//! Requests sent through a custom domain must still be signed for the API
//! Gateway host. Configure a [`HostResolver`] to map the base url onto it.

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod host;
pub use host::{HostFallback, HostResolver};

mod canonical;
pub use canonical::{canonical_headers, canonical_query, canonical_uri, payload_hash};
pub use canonical::CanonicalRequest;

mod diagnostics;
pub use diagnostics::{Diagnostics, LogDiagnostics, NoopDiagnostics};

mod sign_request;
pub use sign_request::{generate_signing_key, string_to_sign};
pub use sign_request::{RequestSigner, SigningMaterial};

mod provide_credential;
pub use provide_credential::*;
