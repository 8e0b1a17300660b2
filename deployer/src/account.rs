//! The deploying account.

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{Provider as _, RootProvider},
    signers::local::PrivateKeySigner,
};
use eyre::WrapErr;

use crate::{config::Config, deploy::Deployer};

/// HTTP provider for the target chain.
pub type Provider = RootProvider<Ethereum>;

/// The signing identity behind the deployment flow.
///
/// Created once at process start from [`Config`]; it authorizes every
/// transaction the flow submits.
#[derive(Clone, Debug)]
pub struct Account {
    /// The account's local private key wrapper.
    pub signer: PrivateKeySigner,
    /// Provider connected to the target chain.
    pub provider: Provider,
}

impl Account {
    /// Create the account described by `config`.
    ///
    /// # Errors
    ///
    /// Fails if the configured private key does not parse. No network
    /// call is made here.
    pub fn new(config: &Config) -> eyre::Result<Self> {
        let signer = config
            .private_key
            .parse::<PrivateKeySigner>()
            .wrap_err("failed to parse the configured private key")?;
        let provider = RootProvider::new_http(config.rpc_url.clone());

        Ok(Self { signer, provider })
    }

    /// The account's address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Gas token balance of the account.
    ///
    /// Deployment assumes the account is already funded on the target
    /// network; this is the hook for checking that precondition.
    ///
    /// # Errors
    ///
    /// Fails on RPC transport errors.
    pub async fn balance(&self) -> eyre::Result<U256> {
        self.provider
            .get_balance(self.address())
            .await
            .wrap_err("failed to query account balance")
    }

    /// Create a configurable contract deployer on behalf of this account.
    #[must_use]
    pub fn as_deployer(&self, config: &Config) -> Deployer {
        Deployer::new(self.clone(), config)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use super::*;

    fn config(private_key: &str) -> Config {
        Config {
            private_key: private_key.to_owned(),
            rpc_url: "http://localhost:3050".parse().expect("valid url"),
            artifacts_dir: PathBuf::from("artifacts-zk"),
            confirm_timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn derives_the_address_from_the_key() {
        // A well-known throwaway key from the local dev node.
        let account = Account::new(&config(
            "0xb6b15c8cb491557369f3c7d2c287b053eb229daa9c22138887752191c9520659",
        ))
        .expect("valid key");

        assert_eq!(account.address(), account.signer.address());
    }

    #[test]
    fn rejects_a_malformed_key() {
        let err = Account::new(&config("not a key")).expect_err("bad key");
        assert!(err.to_string().contains("private key"));
    }
}
