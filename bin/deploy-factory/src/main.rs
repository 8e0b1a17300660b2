//! Deploys the account-abstraction factory contract.
//!
//! The factory's constructor takes the versioned bytecode hash of the
//! multisig account contract, and the deploy transaction ships the
//! multisig's raw bytecode as a factory dependency so the chain knows the
//! code before the factory instantiates it. The multisig itself is never
//! deployed here.
//!
//! Configuration comes from the environment (see [`Config::from_env`]);
//! the deploying account must already hold funds on the target network.

use alloy::dyn_abi::DynSolValue;
use zksync_deployer::{hash_bytecode, Account, ArtifactResolver, Config};

const FACTORY_CONTRACT: &str = "AAFactory";
const MULTISIG_CONTRACT: &str = "TwoUserMultisig";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = Config::from_env()?;
    let account = Account::new(&config)?;
    let resolver = ArtifactResolver::new(&config.artifacts_dir);

    let factory = resolver.load(FACTORY_CONTRACT)?;
    let multisig = resolver.load(MULTISIG_CONTRACT)?;

    let multisig_hash = hash_bytecode(&multisig.bytecode)?;

    // The factory validates and stores the multisig's code hash, so the
    // raw bytecode has to travel with the deploy transaction.
    let deployed = account
        .as_deployer(&config)
        .with_constructor(vec![DynSolValue::FixedBytes(multisig_hash, 32)])
        .with_factory_deps(vec![multisig.bytecode.clone()])
        .deploy(&factory)
        .await?;

    println!("AA factory address: {}", deployed.address);

    Ok(())
}
