//! Receipt helpers.

use alloy::{primitives::Address, rpc::types::TransactionReceipt};
use eyre::ContextCompat;

/// Extension trait recovering the deployed contract's address from a
/// confirmation receipt.
pub trait ReceiptExt {
    /// Address of the contract this receipt confirms.
    ///
    /// # Errors
    ///
    /// Fails if the receipt carries no contract address, i.e. the
    /// transaction deployed nothing.
    fn deployed_address(&self) -> eyre::Result<Address>;
}

impl ReceiptExt for TransactionReceipt {
    fn deployed_address(&self) -> eyre::Result<Address> {
        self.contract_address.context("receipt contains no contract address")
    }
}
