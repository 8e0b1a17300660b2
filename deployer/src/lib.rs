//! Artifact-based contract deployment for zkSync-style chains.
//!
//! The crate covers the whole deployment flow: a [`Config`] read once at
//! process entry, an [`Account`] wrapping the signing key and an HTTP
//! provider, an [`ArtifactResolver`] that loads compiled contracts from a
//! build-output directory, the versioned [`hash_bytecode`] digest the chain
//! uses to reference code, and a [`Deployer`] that submits a single EIP-712
//! deployment transaction and waits for its confirmation.
//!
//! Deployment happens through the deployer system contract rather than
//! through raw init code: the calldata carries the contract's bytecode
//! *hash*, and the raw bytecode of the contract plus everything it
//! instantiates at runtime travels in the transaction's factory
//! dependencies.

mod account;
mod artifact;
mod bytecode;
mod config;
mod deploy;
mod eip712;
mod fee;
mod receipt;

pub use account::{Account, Provider};
pub use artifact::{Artifact, ArtifactResolver};
pub use bytecode::hash_bytecode;
pub use config::{
    Config, ARTIFACTS_DIR_VAR, CONFIRM_TIMEOUT_VAR, PRIVATE_KEY_VAR,
    RPC_URL_VAR,
};
pub use deploy::{DeployedContract, Deployer, CONTRACT_DEPLOYER_ADDRESS};
pub use eip712::{Eip712Transaction, EIP712_TX_TYPE};
pub use fee::Fee;
pub use receipt::ReceiptExt;
