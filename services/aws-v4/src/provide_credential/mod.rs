mod config;
pub use config::ConfigCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;

mod response;
pub use response::ResponseCredentialProvider;

mod r#static;
pub use r#static::StaticCredentialProvider;
