//! Fee estimation against the chain's native fee model.

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::Provider as _,
};
use eyre::WrapErr;
use serde::Deserialize;
use serde_json::json;

use crate::account::Provider;

/// Gas per pubdata byte offered when asking the node for an estimate.
pub(crate) const DEFAULT_GAS_PER_PUBDATA: u64 = 50_000;

/// Fee parameters the node quotes for a prospective transaction.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    /// Gas limit covering execution and pubdata publication.
    pub gas_limit: U256,
    /// Gas charged per byte of published pubdata.
    pub gas_per_pubdata_limit: U256,
    /// Maximum total fee per gas.
    pub max_fee_per_gas: U256,
    /// Maximum priority fee per gas.
    pub max_priority_fee_per_gas: U256,
}

/// Ask the node to price a deployment call.
///
/// The request carries the same `eip712Meta` extension the final
/// transaction will, so the estimate accounts for publishing the factory
/// dependencies.
pub(crate) async fn estimate_fee(
    provider: &Provider,
    from: Address,
    to: Address,
    data: &Bytes,
    factory_deps: &[Bytes],
) -> eyre::Result<Fee> {
    let request = json!({
        "from": from,
        "to": to,
        "data": data,
        "eip712Meta": {
            "gasPerPubdata": format!("{DEFAULT_GAS_PER_PUBDATA:#x}"),
            "factoryDeps": factory_deps
                .iter()
                .map(|dep| dep.to_vec())
                .collect::<Vec<_>>(),
        },
    });

    provider
        .raw_request("zks_estimateFee".into(), [request])
        .await
        .wrap_err("zks_estimateFee failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_node_quote() {
        let fee: Fee = serde_json::from_str(
            r#"{
                "gasLimit": "0x3d0900",
                "gasPerPubdataLimit": "0xc350",
                "maxFeePerGas": "0xee6b280",
                "maxPriorityFeePerGas": "0x0"
            }"#,
        )
        .expect("should parse");

        assert_eq!(fee.gas_limit, U256::from(4_000_000));
        assert_eq!(fee.gas_per_pubdata_limit, U256::from(50_000));
        assert_eq!(fee.max_fee_per_gas, U256::from(250_000_000));
        assert_eq!(fee.max_priority_fee_per_gas, U256::ZERO);
    }
}
