//! The EIP-712 transaction envelope deployments travel in.
//!
//! Factory dependencies only fit in the chain's native transaction type
//! (`0x71`): the account signs an EIP-712 typed payload committing to the
//! *hashes* of every dependency, while the raw bytecodes ride along in the
//! RLP body for the node to publish.

use std::borrow::Cow;

use alloy::{
    primitives::{Address, Bytes, B256, U256},
    signers::{local::PrivateKeySigner, Signer},
    sol,
    sol_types::{Eip712Domain, SolStruct},
};
use alloy_rlp::{Encodable, Header, EMPTY_LIST_CODE, EMPTY_STRING_CODE};
use eyre::WrapErr;

use crate::bytecode::hash_bytecode;

/// Type marker of the chain's EIP-712 transaction.
pub const EIP712_TX_TYPE: u8 = 0x71;

sol! {
    /// Typed payload covered by the account's signature. Field order and
    /// types are fixed by the chain's signing scheme.
    struct Transaction {
        uint256 txType;
        uint256 from;
        uint256 to;
        uint256 gasLimit;
        uint256 gasPerPubdataByteLimit;
        uint256 maxFeePerGas;
        uint256 maxPriorityFeePerGas;
        uint256 paymaster;
        uint256 nonce;
        uint256 value;
        bytes data;
        bytes32[] factoryDeps;
        bytes paymasterInput;
    }
}

/// An unsigned type-`0x71` transaction.
#[derive(Clone, Debug)]
pub struct Eip712Transaction {
    /// Chain id of the target network.
    pub chain_id: u64,
    /// Sender address.
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Account nonce.
    pub nonce: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas offered per byte of published pubdata.
    pub gas_per_pubdata: u64,
    /// Maximum total fee per gas.
    pub max_fee_per_gas: u128,
    /// Maximum priority fee per gas.
    pub max_priority_fee_per_gas: u128,
    /// Value carried by the transaction.
    pub value: U256,
    /// Calldata.
    pub data: Bytes,
    /// Raw bytecode of every contract this transaction makes known to the
    /// chain.
    pub factory_deps: Vec<Bytes>,
}

impl Eip712Transaction {
    /// The EIP-712 domain the payload is signed under.
    #[must_use]
    pub fn domain(&self) -> Eip712Domain {
        Eip712Domain {
            name: Some(Cow::Borrowed("zkSync")),
            version: Some(Cow::Borrowed("2")),
            chain_id: Some(U256::from(self.chain_id)),
            verifying_contract: None,
            salt: None,
        }
    }

    /// Hash the transaction for signing.
    ///
    /// # Errors
    ///
    /// Fails if a factory dependency has an invalid bytecode shape.
    pub fn signing_hash(&self) -> eyre::Result<B256> {
        let factory_deps = self
            .factory_deps
            .iter()
            .map(|dep| hash_bytecode(dep))
            .collect::<eyre::Result<Vec<_>>>()?;

        let payload = Transaction {
            txType: U256::from(EIP712_TX_TYPE),
            from: address_to_word(self.from),
            to: address_to_word(self.to),
            gasLimit: U256::from(self.gas_limit),
            gasPerPubdataByteLimit: U256::from(self.gas_per_pubdata),
            maxFeePerGas: U256::from(self.max_fee_per_gas),
            maxPriorityFeePerGas: U256::from(self.max_priority_fee_per_gas),
            paymaster: U256::ZERO,
            nonce: U256::from(self.nonce),
            value: self.value,
            data: self.data.clone(),
            factoryDeps: factory_deps,
            paymasterInput: Bytes::new(),
        };

        Ok(payload.eip712_signing_hash(&self.domain()))
    }

    /// Sign the transaction with `signer` and return the raw wire bytes,
    /// ready for `eth_sendRawTransaction`.
    ///
    /// # Errors
    ///
    /// Fails if hashing or signing fails.
    pub async fn sign(
        &self,
        signer: &PrivateKeySigner,
    ) -> eyre::Result<Bytes> {
        let hash = self.signing_hash()?;
        let signature = signer
            .sign_hash(&hash)
            .await
            .wrap_err("failed to sign deploy transaction")?;

        Ok(self.encode_signed(&signature.as_bytes()))
    }

    /// RLP-encode the transaction, prefixed with the type byte.
    ///
    /// The 65-byte `signature` travels in the custom-signature slot; the
    /// legacy `v`/`r`/`s` positions carry the chain id and two empty
    /// strings.
    #[must_use]
    pub fn encode_signed(&self, signature: &[u8; 65]) -> Bytes {
        let mut payload = Vec::new();
        self.nonce.encode(&mut payload);
        self.max_priority_fee_per_gas.encode(&mut payload);
        self.max_fee_per_gas.encode(&mut payload);
        self.gas_limit.encode(&mut payload);
        self.to.as_slice().encode(&mut payload);
        encode_u256(self.value, &mut payload);
        self.data.as_ref().encode(&mut payload);
        self.chain_id.encode(&mut payload);
        payload.push(EMPTY_STRING_CODE);
        payload.push(EMPTY_STRING_CODE);
        self.chain_id.encode(&mut payload);
        self.from.as_slice().encode(&mut payload);
        self.gas_per_pubdata.encode(&mut payload);
        encode_bytes_list(&self.factory_deps, &mut payload);
        signature.as_slice().encode(&mut payload);
        // No paymaster.
        payload.push(EMPTY_LIST_CODE);

        let mut out = Vec::with_capacity(payload.len() + 4);
        out.push(EIP712_TX_TYPE);
        Header { list: true, payload_length: payload.len() }.encode(&mut out);
        out.extend_from_slice(&payload);
        out.into()
    }
}

/// Left-pad an address into the `uint256` representation the typed payload
/// uses.
fn address_to_word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

/// Encode `value` as a minimal big-endian RLP integer.
fn encode_u256(value: U256, out: &mut Vec<u8>) {
    value.to_be_bytes_trimmed_vec().as_slice().encode(out);
}

/// Encode a list of byte strings.
fn encode_bytes_list(items: &[Bytes], out: &mut Vec<u8>) {
    let mut payload = Vec::new();
    for item in items {
        item.as_ref().encode(&mut payload);
    }
    Header { list: true, payload_length: payload.len() }.encode(out);
    out.extend_from_slice(&payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Eip712Transaction {
        Eip712Transaction {
            chain_id: 280,
            from: Address::repeat_byte(0x11),
            to: Address::repeat_byte(0x80),
            nonce: 7,
            gas_limit: 4_000_000,
            gas_per_pubdata: 50_000,
            max_fee_per_gas: 250_000_000,
            max_priority_fee_per_gas: 0,
            value: U256::ZERO,
            data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
            factory_deps: vec![Bytes::from(vec![0u8; 32])],
        }
    }

    #[test]
    fn signing_hash_is_deterministic() {
        let tx = sample_tx();
        let first = tx.signing_hash().expect("valid deps");
        let second = tx.signing_hash().expect("valid deps");
        assert_eq!(first, second);
    }

    #[test]
    fn signing_hash_commits_to_the_chain_id() {
        let tx = sample_tx();
        let mut other = sample_tx();
        other.chain_id = 324;

        let lhs = tx.signing_hash().expect("valid deps");
        let rhs = other.signing_hash().expect("valid deps");
        assert_ne!(lhs, rhs);
    }

    #[test]
    fn signing_hash_commits_to_factory_deps() {
        let tx = sample_tx();
        let mut other = sample_tx();
        other.factory_deps = vec![Bytes::from(vec![1u8; 32])];

        let lhs = tx.signing_hash().expect("valid deps");
        let rhs = other.signing_hash().expect("valid deps");
        assert_ne!(lhs, rhs);
    }

    #[test]
    fn malformed_factory_deps_fail_before_signing() {
        let mut tx = sample_tx();
        tx.factory_deps = vec![Bytes::from(vec![0u8; 31])];

        tx.signing_hash().expect_err("31 bytes is not a valid bytecode");
    }

    #[tokio::test]
    async fn signed_encoding_is_a_typed_rlp_list() {
        let signer = PrivateKeySigner::random();
        let raw = sample_tx().sign(&signer).await.expect("should sign");

        assert_eq!(raw[0], EIP712_TX_TYPE);

        let mut body = &raw[1..];
        let header = Header::decode(&mut body).expect("well-formed header");
        assert!(header.list);
        // The header's payload is exactly the rest of the buffer.
        assert_eq!(header.payload_length, body.len());
    }

    #[tokio::test]
    async fn signing_is_reproducible_for_the_same_payload() {
        let signer = PrivateKeySigner::random();
        let tx = sample_tx();

        // RFC 6979 nonces make ECDSA deterministic, so the whole wire
        // encoding is stable for a fixed key and payload.
        let first = tx.sign(&signer).await.expect("should sign");
        let second = tx.sign(&signer).await.expect("should sign");
        assert_eq!(first, second);
    }
}
