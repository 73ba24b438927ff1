//! Shared HTTP client construction for the network-backed capability
//! adapters (transcriber, translator, synthesizer). Centralizes the two
//! environment toggles every provider must honor per the external-interface
//! contract: a CA-certificate override for talking to endpoints behind a
//! private root, and an opt-in switch to skip certificate validation
//! entirely when developing against a self-signed endpoint.

use std::fs;

/// Reads `VOXRELAY_CA_CERT` (a PEM file path) and `ALLOW_INSECURE_SSL`
/// (any value other than unset/"0"/"false" enables it, default off) and
/// builds a [`reqwest::Client`] honoring them. Errors building the client
/// (unreadable cert file, malformed PEM, backend failure) are returned as
/// a plain `String` so each provider's `from_env` can wrap it in its own
/// `ConfigError`/`InvalidConfig` variant.
pub fn build_http_client() -> Result<reqwest::Client, String> {
    let mut builder = reqwest::Client::builder();

    if let Ok(path) = std::env::var("VOXRELAY_CA_CERT") {
        let pem = fs::read(&path).map_err(|e| format!("failed to read VOXRELAY_CA_CERT {path}: {e}"))?;
        let cert = reqwest::Certificate::from_pem(&pem)
            .map_err(|e| format!("failed to parse VOXRELAY_CA_CERT {path}: {e}"))?;
        builder = builder.add_root_certificate(cert);
    }

    if allow_insecure_ssl() {
        tracing::warn!("ALLOW_INSECURE_SSL is set: TLS certificate validation is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(|e| format!("failed to build HTTP client: {e}"))
}

fn allow_insecure_ssl() -> bool {
    match std::env::var("ALLOW_INSECURE_SSL") {
        Ok(v) => !matches!(v.as_str(), "" | "0" | "false" | "FALSE" | "False"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_secure() {
        std::env::remove_var("ALLOW_INSECURE_SSL");
        assert!(!allow_insecure_ssl());
    }

    #[test]
    fn falsy_values_stay_secure() {
        for v in ["0", "false", "FALSE"] {
            std::env::set_var("ALLOW_INSECURE_SSL", v);
            assert!(!allow_insecure_ssl(), "{v} should not enable insecure SSL");
        }
        std::env::remove_var("ALLOW_INSECURE_SSL");
    }

    #[test]
    fn truthy_value_enables_insecure_ssl() {
        std::env::set_var("ALLOW_INSECURE_SSL", "1");
        assert!(allow_insecure_ssl());
        std::env::remove_var("ALLOW_INSECURE_SSL");
    }
}
