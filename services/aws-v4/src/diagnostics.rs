use std::fmt::Debug;

use log::info;

use crate::SigningMaterial;

/// Diagnostics receives the material of every signed request.
///
/// It is purely observational: nothing it records feeds back into signing.
pub trait Diagnostics: Debug + Send + Sync + 'static {
    /// Record the material produced while signing one request.
    fn record(&self, material: &SigningMaterial);
}

/// NoopDiagnostics drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn record(&self, _: &SigningMaterial) {}
}

/// LogDiagnostics writes the canonical request, string to sign and
/// authorization header through `log` at info level.
///
/// Useful to find out why a gateway answers `403` with a signature mismatch.
/// The output contains the session token and must not be enabled in shared
/// logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl LogDiagnostics {
    /// Log target used for all records.
    pub const TARGET: &'static str = "apigw_sign::diagnostics";
}

impl Diagnostics for LogDiagnostics {
    fn record(&self, material: &SigningMaterial) {
        info!(target: Self::TARGET, "canonical request:\n{}", material.canonical_request);
        info!(target: Self::TARGET, "string to sign:\n{}", material.string_to_sign);
        info!(target: Self::TARGET, "authorization header:\n{}", material.authorization);
    }
}
