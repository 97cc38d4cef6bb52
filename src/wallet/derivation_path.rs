//! BIP-44 Derivation Paths
//!
//! The vault uses one fixed path shape per chain:
//! - Solana:   `m/44'/501'/{index}'/0'` (every level hardened, SLIP-0010)
//! - Ethereum: `m/44'/60'/0'/0/{index}` (BIP-44, last two levels normal)

use std::fmt;
use std::str::FromStr;

use crate::error::{VaultError, VaultResult};
use crate::types::Blockchain;

/// BIP-44 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// Hardened offset for BIP-32 derivation
pub const HARDENED: u32 = 0x80000000;

/// Single component of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationComponent {
    pub index: u32,
    pub hardened: bool,
}

impl DerivationComponent {
    pub fn hardened(index: u32) -> Self {
        Self {
            index,
            hardened: true,
        }
    }

    pub fn normal(index: u32) -> Self {
        Self {
            index,
            hardened: false,
        }
    }

    /// Index including the hardened bit
    pub fn full_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl fmt::Display for DerivationComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// Parsed derivation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    components: Vec<DerivationComponent>,
}

impl DerivationPath {
    pub fn new(components: Vec<DerivationComponent>) -> Self {
        Self { components }
    }

    /// The path the vault derives wallet `index` at on `chain`.
    ///
    /// `index` must stay below 2^31 so it fits a single path level.
    pub fn for_chain(chain: Blockchain, index: u32) -> VaultResult<Self> {
        check_index(index)?;

        let purpose = DerivationComponent::hardened(BIP44_PURPOSE);
        let coin = DerivationComponent::hardened(chain.coin_type());
        let components = match chain {
            Blockchain::Solana => vec![
                purpose,
                coin,
                DerivationComponent::hardened(index),
                DerivationComponent::hardened(0),
            ],
            Blockchain::Ethereum => vec![
                purpose,
                coin,
                DerivationComponent::hardened(0),
                DerivationComponent::normal(0),
                DerivationComponent::normal(index),
            ],
        };

        Ok(Self { components })
    }

    pub fn components(&self) -> &[DerivationComponent] {
        &self.components
    }

    pub fn depth(&self) -> usize {
        self.components.len()
    }

    pub fn purpose(&self) -> Option<u32> {
        self.components.first().map(|c| c.index)
    }

    pub fn coin_type(&self) -> Option<u32> {
        self.components.get(1).map(|c| c.index)
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.components.iter().all(|c| c.hardened)
    }

    /// Check that `chain`'s curve can walk this path
    pub fn check_for_chain(&self, chain: Blockchain) -> VaultResult<()> {
        if !chain.curve().supports_normal_derivation() && !self.is_fully_hardened() {
            return Err(VaultError::validation(format!(
                "{} paths must be fully hardened: {}",
                chain.config().name,
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = VaultError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim();

        let rest = match trimmed {
            "m" | "M" => return Ok(Self::new(Vec::new())),
            _ => trimmed
                .strip_prefix("m/")
                .or_else(|| trimmed.strip_prefix("M/"))
                .ok_or_else(|| VaultError::validation("Derivation path must start with 'm/'"))?,
        };

        let components = rest
            .split('/')
            .map(parse_component)
            .collect::<VaultResult<Vec<_>>>()?;

        Ok(Self { components })
    }
}

fn parse_component(s: &str) -> VaultResult<DerivationComponent> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(VaultError::validation("Empty path component"));
    }

    let (number, hardened) = match trimmed.strip_suffix(['\'', 'h', 'H']) {
        Some(number) => (number, true),
        None => (trimmed, false),
    };

    let index: u32 = number.parse().map_err(|e| {
        VaultError::validation(format!("Invalid path component '{}': {}", s, e))
    })?;
    check_index(index)?;

    Ok(DerivationComponent { index, hardened })
}

fn check_index(index: u32) -> VaultResult<()> {
    if index >= HARDENED {
        return Err(VaultError::validation(format!(
            "Derivation index {} exceeds maximum {}",
            index,
            HARDENED - 1
        )));
    }
    Ok(())
}
