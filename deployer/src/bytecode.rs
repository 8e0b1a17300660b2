//! Versioned bytecode hashing.
//!
//! The chain references contract code by a digest rather than by embedding
//! it: the sha256 of the bytecode, with the first four bytes replaced by a
//! version marker and the bytecode's length in 32-byte words. The deployer
//! system contract only instantiates code whose digest it has seen, which
//! is why factory-style contracts take these hashes as constructor
//! arguments.

use alloy::primitives::B256;
use eyre::{bail, ensure};
use sha2::{Digest, Sha256};

/// Marker distinguishing version 1.0 of the code hash layout.
const CODE_HASH_VERSION: [u8; 2] = [1, 0];

/// Maximum bytecode length in 32-byte words.
const MAX_BYTECODE_WORDS: usize = u16::MAX as usize;

/// Compute the versioned hash of `code`.
///
/// Identical bytecode always yields an identical hash.
///
/// # Errors
///
/// Fails if the bytecode length is not a multiple of 32, if its length in
/// 32-byte words is even, or if it exceeds [`u16::MAX`] words. These are
/// the shapes the chain itself refuses to instantiate.
pub fn hash_bytecode(code: &[u8]) -> eyre::Result<B256> {
    ensure!(
        code.len() % 32 == 0,
        "bytecode length {} is not divisible by 32",
        code.len()
    );
    let words = code.len() / 32;
    ensure!(
        words <= MAX_BYTECODE_WORDS,
        "bytecode is {words} words long, maximum is {MAX_BYTECODE_WORDS}"
    );
    if words % 2 == 0 {
        bail!("bytecode length in 32-byte words must be odd, got {words}");
    }

    let mut hash: [u8; 32] = Sha256::digest(code).into();
    hash[..2].copy_from_slice(&CODE_HASH_VERSION);
    hash[2..4].copy_from_slice(&u16::try_from(words)?.to_be_bytes());

    Ok(B256::new(hash))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn stamps_version_and_length_over_the_digest() {
        let hash = hash_bytecode(&[0u8; 32]).expect("single word is valid");
        // sha256 of 32 zero bytes, first four bytes replaced with the
        // version marker and a word count of one.
        let expected = hex!(
            "01000001f862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925"
        );
        assert_eq!(hash, B256::new(expected));
    }

    #[test]
    fn is_deterministic() {
        let code = [0xAB; 96];
        let first = hash_bytecode(&code).expect("three words are valid");
        let second = hash_bytecode(&code).expect("three words are valid");
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_unaligned_bytecode() {
        let err = hash_bytecode(&[0u8; 31]).expect_err("31 bytes");
        assert!(err.to_string().contains("not divisible by 32"));
    }

    #[test]
    fn rejects_an_even_word_count() {
        let err = hash_bytecode(&[0u8; 64]).expect_err("two words");
        assert!(err.to_string().contains("must be odd"));
    }

    #[test]
    fn rejects_oversized_bytecode() {
        let code = vec![0u8; 32 * (MAX_BYTECODE_WORDS + 2)];
        let err = hash_bytecode(&code).expect_err("too many words");
        assert!(err.to_string().contains("maximum"));
    }
}
