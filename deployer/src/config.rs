//! Process configuration.
//!
//! Environment access happens here, once, at process entry. Everything
//! deeper receives the resulting [`Config`] value explicitly; no component
//! reads ambient state on its own.

use std::{path::PathBuf, time::Duration};

use alloy::transports::http::reqwest::Url;
use eyre::WrapErr;

/// Environment variable holding the deployer account's private key.
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

/// Environment variable holding the chain's JSON-RPC endpoint.
pub const RPC_URL_VAR: &str = "RPC_URL";

/// Environment variable pointing at the compiled artifact directory.
pub const ARTIFACTS_DIR_VAR: &str = "ARTIFACTS_DIR";

/// Environment variable overriding the confirmation timeout, in seconds.
pub const CONFIRM_TIMEOUT_VAR: &str = "CONFIRM_TIMEOUT_SECS";

const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Deployment configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Hex-encoded private key of the deploying account.
    pub private_key: String,
    /// JSON-RPC endpoint of the target chain.
    pub rpc_url: Url,
    /// Directory holding compiled contract artifacts.
    pub artifacts_dir: PathBuf,
    /// How long to wait for the deploy transaction to confirm.
    pub confirm_timeout: Duration,
}

impl Config {
    /// Load the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails if a required variable is absent or does not parse. No
    /// network connection is attempted here, so a missing credential
    /// aborts the flow before anything reaches the chain.
    pub fn from_env() -> eyre::Result<Self> {
        let private_key = env(PRIVATE_KEY_VAR)?;
        let rpc_url = env(RPC_URL_VAR)?
            .parse::<Url>()
            .wrap_err(format!("failed to parse {RPC_URL_VAR}"))?;
        let artifacts_dir = PathBuf::from(env(ARTIFACTS_DIR_VAR)?);
        let confirm_timeout = match std::env::var(CONFIRM_TIMEOUT_VAR) {
            Ok(secs) => Duration::from_secs(
                secs.parse()
                    .wrap_err(format!("failed to parse {CONFIRM_TIMEOUT_VAR}"))?,
            ),
            Err(_) => DEFAULT_CONFIRM_TIMEOUT,
        };

        Ok(Self { private_key, rpc_url, artifacts_dir, confirm_timeout })
    }
}

/// Load the `name` environment variable.
fn env(name: &str) -> eyre::Result<String> {
    std::env::var(name).wrap_err(format!("failed to load {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-wide, so every scenario lives in
    // one test to keep them from racing each other.
    #[test]
    fn reads_the_environment_once_at_entry() {
        std::env::remove_var(PRIVATE_KEY_VAR);
        std::env::remove_var(RPC_URL_VAR);
        std::env::remove_var(ARTIFACTS_DIR_VAR);
        std::env::remove_var(CONFIRM_TIMEOUT_VAR);

        // A missing credential fails immediately.
        let err = Config::from_env().expect_err("should require a key");
        assert!(err.to_string().contains(PRIVATE_KEY_VAR));

        std::env::set_var(
            PRIVATE_KEY_VAR,
            "0xb6b15c8cb491557369f3c7d2c287b053eb229daa9c22138887752191c9520659",
        );
        std::env::set_var(RPC_URL_VAR, "http://localhost:3050");
        std::env::set_var(ARTIFACTS_DIR_VAR, "artifacts-zk");

        let config = Config::from_env().expect("should load config");
        assert_eq!(config.artifacts_dir, PathBuf::from("artifacts-zk"));
        assert_eq!(config.confirm_timeout, DEFAULT_CONFIRM_TIMEOUT);

        std::env::set_var(CONFIRM_TIMEOUT_VAR, "120");
        let config = Config::from_env().expect("should load config");
        assert_eq!(config.confirm_timeout, Duration::from_secs(120));

        std::env::set_var(CONFIRM_TIMEOUT_VAR, "not a number");
        Config::from_env().expect_err("should reject a bad timeout");
    }
}
