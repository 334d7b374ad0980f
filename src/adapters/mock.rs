//! Placeholder transaction references
//!
//! Randomized hex shaped per chain family so status payloads always carry a
//! reference. They carry no cryptographic or correlation meaning.

use crate::assets::ChainFamily;

use uuid::Uuid;

/// Generate a placeholder transaction reference for `chain`
pub fn mock_tx_ref(chain: &str) -> String {
    match ChainFamily::of(chain) {
        ChainFamily::Evm => format!("0x{}", random_hex(64)),
        ChainFamily::Near => random_hex(44),
        ChainFamily::Solana => random_hex(88),
        ChainFamily::Bitcoin => random_hex(64),
        ChainFamily::Other => format!("sim-{}", random_hex(64)),
    }
}

fn random_hex(len: usize) -> String {
    let mut out = String::with_capacity(len + 32);
    while out.len() < len {
        out.push_str(&Uuid::new_v4().simple().to_string());
    }
    out.truncate(len);
    out
}
