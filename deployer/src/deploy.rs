//! Contract deployment through the deployer system contract.

use std::time::Duration;

use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    network::ReceiptResponse,
    primitives::{address, Address, Bytes, B256, U256},
    providers::Provider as _,
    rpc::types::TransactionReceipt,
    sol,
    sol_types::SolCall,
};
use eyre::{bail, ensure, WrapErr};

use crate::{
    account::Account, artifact::Artifact, bytecode::hash_bytecode,
    config::Config, eip712::Eip712Transaction, fee::estimate_fee,
    receipt::ReceiptExt,
};

/// The deployer system contract, present at the same address on every
/// chain this crate targets.
pub const CONTRACT_DEPLOYER_ADDRESS: Address =
    address!("0000000000000000000000000000000000008006");

sol! {
    /// Deployment entrypoints of the deployer system contract.
    interface IContractDeployer {
        function create(
            bytes32 salt,
            bytes32 bytecodeHash,
            bytes calldata input
        ) external payable returns (address);

        function create2(
            bytes32 salt,
            bytes32 bytecodeHash,
            bytes calldata input
        ) external payable returns (address);
    }
}

/// A contract deployed and confirmed on the target chain.
///
/// Created only once the deploy transaction confirms; immutable
/// afterwards.
#[derive(Clone, Debug)]
pub struct DeployedContract {
    /// Network address of the contract.
    pub address: Address,
    /// The contract's interface descriptor.
    pub abi: JsonAbi,
    /// Confirmation receipt of the deploy transaction.
    pub receipt: TransactionReceipt,
}

/// A configurable smart contract deployer.
///
/// Each [`Deployer::deploy`] call issues exactly one deployment
/// transaction and blocks until the chain confirms it. Failures surface
/// unchanged; there is no retry.
#[derive(Clone, Debug)]
pub struct Deployer {
    account: Account,
    confirm_timeout: Duration,
    ctor_args: Vec<DynSolValue>,
    factory_deps: Vec<Bytes>,
    salt: Option<B256>,
    value: U256,
}

impl Deployer {
    /// Create a deployer acting on behalf of `account`.
    #[must_use]
    pub fn new(account: Account, config: &Config) -> Self {
        Self {
            account,
            confirm_timeout: config.confirm_timeout,
            ctor_args: Vec::new(),
            factory_deps: Vec::new(),
            salt: None,
            value: U256::ZERO,
        }
    }

    /// Add constructor arguments for the deployed contract.
    #[must_use]
    pub fn with_constructor(mut self, args: Vec<DynSolValue>) -> Self {
        self.ctor_args = args;
        self
    }

    /// Supply the raw bytecode of every contract the deployed contract
    /// instantiates itself.
    ///
    /// The target contract's own bytecode is always shipped and need not
    /// be listed.
    #[must_use]
    pub fn with_factory_deps(mut self, deps: Vec<Bytes>) -> Self {
        self.factory_deps = deps;
        self
    }

    /// Deploy through `create2` with the given salt instead of `create`.
    #[must_use]
    pub fn with_salt(mut self, salt: B256) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Attach value to the deployment transaction.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Submit the deployment transaction for `artifact` and wait for its
    /// confirmation.
    ///
    /// # Errors
    ///
    /// Fails locally on malformed constructor arguments or bytecode, and
    /// surfaces node-side failures unchanged: estimate rejections,
    /// transport errors, reverts, and a confirmation wait exceeding the
    /// configured timeout.
    pub async fn deploy(
        self,
        artifact: &Artifact,
    ) -> eyre::Result<DeployedContract> {
        let data = deploy_calldata(artifact, &self.ctor_args, self.salt)?;
        let factory_deps = collect_factory_deps(artifact, &self.factory_deps);

        let provider = &self.account.provider;
        let from = self.account.address();

        let fee = estimate_fee(
            provider,
            from,
            CONTRACT_DEPLOYER_ADDRESS,
            &data,
            &factory_deps,
        )
        .await?;
        let nonce = provider
            .get_transaction_count(from)
            .await
            .wrap_err("failed to fetch account nonce")?;
        let chain_id = provider
            .get_chain_id()
            .await
            .wrap_err("failed to fetch chain id")?;

        let tx = Eip712Transaction {
            chain_id,
            from,
            to: CONTRACT_DEPLOYER_ADDRESS,
            nonce,
            gas_limit: to_u64(fee.gas_limit, "gas limit")?,
            gas_per_pubdata: to_u64(
                fee.gas_per_pubdata_limit,
                "gas per pubdata",
            )?,
            max_fee_per_gas: to_u128(fee.max_fee_per_gas, "max fee")?,
            max_priority_fee_per_gas: to_u128(
                fee.max_priority_fee_per_gas,
                "max priority fee",
            )?,
            value: self.value,
            data,
            factory_deps,
        };

        let raw = tx.sign(&self.account.signer).await?;
        let receipt = provider
            .send_raw_transaction(&raw)
            .await
            .wrap_err("failed to submit deploy transaction")?
            .with_timeout(Some(self.confirm_timeout))
            .get_receipt()
            .await
            .wrap_err("deploy transaction was not confirmed in time")?;

        if !receipt.status() {
            bail!("deploy transaction {} reverted", receipt.transaction_hash);
        }

        let address = receipt.deployed_address()?;

        Ok(DeployedContract { address, abi: artifact.abi.clone(), receipt })
    }
}

/// Build the calldata of the deployment call.
///
/// The deployer system contract receives the artifact's versioned bytecode
/// hash and the ABI-encoded constructor arguments; raw bytecode never
/// appears in the calldata.
fn deploy_calldata(
    artifact: &Artifact,
    args: &[DynSolValue],
    salt: Option<B256>,
) -> eyre::Result<Bytes> {
    let bytecode_hash =
        hash_bytecode(&artifact.bytecode).wrap_err_with(|| {
            format!("invalid bytecode in artifact `{}`", artifact.contract_name)
        })?;
    let input = encode_constructor_args(artifact, args)?;

    let data = match salt {
        None => IContractDeployer::createCall {
            salt: B256::ZERO,
            bytecodeHash: bytecode_hash,
            input: input.into(),
        }
        .abi_encode(),
        Some(salt) => IContractDeployer::create2Call {
            salt,
            bytecodeHash: bytecode_hash,
            input: input.into(),
        }
        .abi_encode(),
    };

    Ok(data.into())
}

/// ABI-encode `args` against the artifact's constructor.
fn encode_constructor_args(
    artifact: &Artifact,
    args: &[DynSolValue],
) -> eyre::Result<Vec<u8>> {
    let Some(constructor) = artifact.abi.constructor() else {
        ensure!(
            args.is_empty(),
            "contract `{}` has no constructor, but {} argument(s) were given",
            artifact.contract_name,
            args.len()
        );
        return Ok(Vec::new());
    };

    ensure!(
        constructor.inputs.len() == args.len(),
        "constructor of `{}` takes {} argument(s), got {}",
        artifact.contract_name,
        constructor.inputs.len(),
        args.len()
    );

    for (i, (param, value)) in
        constructor.inputs.iter().zip(args).enumerate()
    {
        let supplied = value
            .sol_type_name()
            .unwrap_or_else(|| "unknown".into());
        ensure!(
            supplied.as_ref() == param.ty.as_str(),
            "constructor argument {i} of `{}` must be `{}`, got `{supplied}`",
            artifact.contract_name,
            param.ty
        );
    }

    Ok(DynSolValue::Tuple(args.to_vec()).abi_encode_params())
}

/// The dependency list shipped with the deploy transaction: the target
/// contract's own bytecode plus every auxiliary dependency, deduplicated.
fn collect_factory_deps(artifact: &Artifact, extra: &[Bytes]) -> Vec<Bytes> {
    let mut deps = vec![artifact.bytecode.clone()];
    for dep in extra {
        if !deps.contains(dep) {
            deps.push(dep.clone());
        }
    }
    deps
}

fn to_u64(value: U256, what: &str) -> eyre::Result<u64> {
    u64::try_from(value)
        .map_err(|_| eyre::eyre!("{what} {value} overflows u64"))
}

fn to_u128(value: U256, what: &str) -> eyre::Result<u128> {
    u128::try_from(value)
        .map_err(|_| eyre::eyre!("{what} {value} overflows u128"))
}
