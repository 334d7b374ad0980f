//! Deterministic cross-chain facilitator for local development

use super::{mock_tx_ref, CrossChainFacilitator, DerivedAddress, DestinationTxRequest};
use crate::assets::ChainFamily;
use crate::error::AdapterResult;

use async_trait::async_trait;
use sha3::{Digest, Keccak256};
use tracing::debug;

/// Facilitator that derives addresses from a keccak256 digest of
/// `account:chain` and fabricates destination references locally.
///
/// The same account and chain always produce the same address.
#[derive(Debug, Clone, Default)]
pub struct SimulatedFacilitator;

impl SimulatedFacilitator {
    pub fn new() -> Self {
        Self
    }

    fn digest(account: &str, chain: &str) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(account.as_bytes());
        hasher.update(b":");
        hasher.update(chain.as_bytes());
        hasher.finalize().into()
    }
}

#[async_trait]
impl CrossChainFacilitator for SimulatedFacilitator {
    async fn derive_address(&self, account: &str, chain: &str) -> AdapterResult<DerivedAddress> {
        let digest = Self::digest(account, chain);

        let address = match ChainFamily::of(chain) {
            ChainFamily::Evm => format!("0x{}", hex::encode(&digest[12..])),
            ChainFamily::Bitcoin => format!("bc1q{}", hex::encode(&digest[..19])),
            ChainFamily::Near | ChainFamily::Solana | ChainFamily::Other => hex::encode(digest),
        };
        let public_key = format!("secp256k1:{}", hex::encode(Keccak256::digest(digest)));

        debug!("Derived {} address for {}: {}", chain, account, address);
        Ok(DerivedAddress {
            address,
            public_key,
        })
    }

    async fn simulate_destination_tx(
        &self,
        request: &DestinationTxRequest,
    ) -> AdapterResult<String> {
        let tx_ref = mock_tx_ref(&request.chain);
        debug!(
            "Simulated {} transaction {} for origin tx {}",
            request.chain, tx_ref, request.correlate_to
        );
        Ok(tx_ref)
    }
}
