//! Address Scanner
//!
//! Recognizes and classifies token address substrings in free chat text.
//! A Solana-shaped match always wins over an EVM-shaped one, even when the
//! EVM match appears earlier in the text; only the first match of the
//! winning kind is used. This asymmetry is intentional and must not be
//! replaced with nearest-match-wins.

use regex::Regex;

use super::record::{AddressCandidate, ChainKind};

/// Base58 alphabet run of 32-44 chars (no 0, O, I, l)
const SOLANA_PATTERN: &str = r"[1-9A-HJ-NP-Za-km-z]{32,44}";
/// 0x followed by exactly 40 hex chars
const EVM_PATTERN: &str = r"0x[a-fA-F0-9]{40}";

/// Pure scanner over message text; regexes compiled once at construction
#[derive(Debug, Clone)]
pub struct AddressScanner {
    solana: Regex,
    evm: Regex,
}

impl AddressScanner {
    pub fn new() -> Self {
        Self {
            solana: Regex::new(SOLANA_PATTERN).expect("valid Solana pattern"),
            evm: Regex::new(EVM_PATTERN).expect("valid EVM pattern"),
        }
    }

    /// Find the first address-shaped substring, Solana taking precedence
    pub fn scan(&self, text: &str) -> Option<AddressCandidate> {
        if let Some(m) = self.solana.find(text) {
            return Some(AddressCandidate {
                address: m.as_str().to_string(),
                chain: ChainKind::Solana,
            });
        }
        if let Some(m) = self.evm.find(text) {
            return Some(AddressCandidate {
                address: m.as_str().to_string(),
                chain: ChainKind::Evm,
            });
        }
        None
    }
}

impl Default for AddressScanner {
    fn default() -> Self {
        Self::new()
    }
}
