// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static registry of the networks a project can target.
//!
//! Every chain carries its network endpoints, the language and framework
//! generated contracts are written in, the wallet signature scheme used at
//! sign-in, and the context injected into generation prompts.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported blockchain networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Solana,
    Ethereum,
    Sui,
    Xrp,
    Polygon,
    Avalanche,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chain: {0}")]
pub struct UnknownChain(pub String);

/// How a wallet on this chain signs the login message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignatureScheme {
    /// Detached Ed25519 over the raw message; base58 address and signature.
    Ed25519Base58,
    /// secp256k1 `personal_sign` (EIP-191); hex address and signature.
    Eip191,
    /// Sui `signPersonalMessage`: intent-wrapped, BLAKE2b digest, Ed25519.
    SuiPersonalMessage,
    /// XRPL keypair signature (Ed25519 or secp256k1). The wallet also
    /// presents its public key, whose classic address must match.
    Xrpl,
}

/// Chain details fed into the generation prompt.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub language: &'static str,
    pub framework: &'static str,
    pub wallet: &'static str,
    pub features: &'static str,
}

/// Static configuration for one chain.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub id: ChainType,
    pub name: &'static str,
    pub symbol: &'static str,
    pub rpc_url: &'static str,
    pub testnet_rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub testnet_explorer_url: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    /// Language generated contracts are written in.
    pub language: &'static str,
    pub framework: &'static str,
    pub wallet_required: bool,
    /// Shown first in chain pickers.
    pub featured: bool,
    pub signature_scheme: SignatureScheme,
    pub generation: GenerationContext,
    /// File extension of exported agent/contract sources.
    pub agent_extension: &'static str,
}

static CHAINS: [ChainConfig; 6] = [
    ChainConfig {
        id: ChainType::Solana,
        name: "Solana",
        symbol: "SOL",
        rpc_url: "https://api.mainnet-beta.solana.com",
        testnet_rpc_url: "https://api.devnet.solana.com",
        explorer_url: "https://explorer.solana.com",
        testnet_explorer_url: "https://explorer.solana.com/?cluster=devnet",
        color: "#9945FF",
        icon: "🟣",
        language: "Rust",
        framework: "Anchor",
        wallet_required: true,
        featured: true,
        signature_scheme: SignatureScheme::Ed25519Base58,
        generation: GenerationContext {
            language: "Rust/TypeScript",
            framework: "Anchor",
            wallet: "Phantom/Solflare",
            features: "high-speed transactions, low fees, NFT support",
        },
        agent_extension: "rs",
    },
    ChainConfig {
        id: ChainType::Ethereum,
        name: "Ethereum",
        symbol: "ETH",
        rpc_url: "https://eth-mainnet.g.alchemy.com/v2/",
        testnet_rpc_url: "https://eth-sepolia.g.alchemy.com/v2/",
        explorer_url: "https://etherscan.io",
        testnet_explorer_url: "https://sepolia.etherscan.io",
        color: "#627EEA",
        icon: "🔷",
        language: "Solidity",
        framework: "Foundry",
        wallet_required: true,
        featured: true,
        signature_scheme: SignatureScheme::Eip191,
        generation: GenerationContext {
            language: "Solidity/TypeScript",
            framework: "Foundry/Hardhat",
            wallet: "MetaMask",
            features: "smart contracts, DeFi, ERC standards",
        },
        agent_extension: "sol",
    },
    ChainConfig {
        id: ChainType::Sui,
        name: "Sui",
        symbol: "SUI",
        rpc_url: "https://fullnode.mainnet.sui.io:443",
        testnet_rpc_url: "https://fullnode.testnet.sui.io:443",
        explorer_url: "https://suiexplorer.com",
        testnet_explorer_url: "https://suiexplorer.com/?network=testnet",
        color: "#4FA8FF",
        icon: "🔵",
        language: "Move",
        framework: "Sui CLI",
        wallet_required: true,
        featured: true,
        signature_scheme: SignatureScheme::SuiPersonalMessage,
        generation: GenerationContext {
            language: "Move/TypeScript",
            framework: "Sui CLI",
            wallet: "Sui Wallet",
            features: "object-oriented, parallel execution, gas optimization",
        },
        agent_extension: "move",
    },
    ChainConfig {
        id: ChainType::Xrp,
        name: "XRP Ledger",
        symbol: "XRP",
        rpc_url: "wss://xrplcluster.com",
        testnet_rpc_url: "wss://s.altnet.rippletest.net:51233",
        explorer_url: "https://xrpscan.com",
        testnet_explorer_url: "https://testnet.xrpscan.com",
        color: "#23292F",
        icon: "💧",
        language: "JavaScript",
        framework: "xrpl.js",
        wallet_required: false,
        featured: true,
        signature_scheme: SignatureScheme::Xrpl,
        generation: GenerationContext {
            language: "JavaScript",
            framework: "xrpl.js",
            wallet: "XRP Wallet",
            features: "fast payments, low fees, built-in DEX",
        },
        agent_extension: "js",
    },
    ChainConfig {
        id: ChainType::Polygon,
        name: "Polygon",
        symbol: "MATIC",
        rpc_url: "https://polygon-rpc.com",
        testnet_rpc_url: "https://rpc-mumbai.maticvigil.com",
        explorer_url: "https://polygonscan.com",
        testnet_explorer_url: "https://mumbai.polygonscan.com",
        color: "#8247E5",
        icon: "🟣",
        language: "Solidity",
        framework: "Foundry",
        wallet_required: true,
        featured: false,
        signature_scheme: SignatureScheme::Eip191,
        generation: GenerationContext {
            language: "Solidity/TypeScript",
            framework: "Foundry/Hardhat",
            wallet: "MetaMask",
            features: "EVM compatible, low fees, fast transactions",
        },
        agent_extension: "sol",
    },
    ChainConfig {
        id: ChainType::Avalanche,
        name: "Avalanche",
        symbol: "AVAX",
        rpc_url: "https://api.avax.network/ext/bc/C/rpc",
        testnet_rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
        explorer_url: "https://snowtrace.io",
        testnet_explorer_url: "https://testnet.snowtrace.io",
        color: "#E84142",
        icon: "🔴",
        language: "Solidity",
        framework: "Foundry",
        wallet_required: true,
        featured: false,
        signature_scheme: SignatureScheme::Eip191,
        generation: GenerationContext {
            language: "Solidity/TypeScript",
            framework: "Foundry/Hardhat",
            wallet: "MetaMask",
            features: "EVM compatible, subnets, high throughput",
        },
        agent_extension: "sol",
    },
];

impl ChainType {
    pub const ALL: [ChainType; 6] = [
        ChainType::Solana,
        ChainType::Ethereum,
        ChainType::Sui,
        ChainType::Xrp,
        ChainType::Polygon,
        ChainType::Avalanche,
    ];

    /// Wire name, as stored and accepted over the API.
    pub fn as_str(self) -> &'static str {
        match self {
            ChainType::Solana => "solana",
            ChainType::Ethereum => "ethereum",
            ChainType::Sui => "sui",
            ChainType::Xrp => "xrp",
            ChainType::Polygon => "polygon",
            ChainType::Avalanche => "avalanche",
        }
    }

    pub fn config(self) -> &'static ChainConfig {
        let index = match self {
            ChainType::Solana => 0,
            ChainType::Ethereum => 1,
            ChainType::Sui => 2,
            ChainType::Xrp => 3,
            ChainType::Polygon => 4,
            ChainType::Avalanche => 5,
        };
        &CHAINS[index]
    }

    pub fn signature_scheme(self) -> SignatureScheme {
        self.config().signature_scheme
    }

    /// Canonical form used as the wallet uniqueness key.
    ///
    /// EVM addresses become `0x`-prefixed lower-case hex whatever form they
    /// arrived in. Sui addresses are lower-cased; base58 and XRPL addresses
    /// are case-sensitive and are only trimmed.
    pub fn normalize_address(self, address: &str) -> String {
        let trimmed = address.trim();
        match self.signature_scheme() {
            SignatureScheme::Eip191 => {
                canonical_evm_address(trimmed).unwrap_or_else(|| trimmed.to_ascii_lowercase())
            }
            SignatureScheme::SuiPersonalMessage => trimmed.to_ascii_lowercase(),
            SignatureScheme::Ed25519Base58 | SignatureScheme::Xrpl => trimmed.to_string(),
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainType {
    type Err = UnknownChain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainType::ALL
            .into_iter()
            .find(|chain| chain.as_str() == s)
            .ok_or_else(|| UnknownChain(s.to_string()))
    }
}

/// `0x` + lower-case hex of a 20-byte address given with or without the
/// prefix, in any case. `None` if `raw` is not such an address.
pub fn canonical_evm_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let address: Address = hex.parse().ok()?;
    Some(format!("{address:#x}"))
}

/// All registered chains, in display order.
pub fn all_chains() -> &'static [ChainConfig] {
    &CHAINS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_chain_in_order() {
        assert_eq!(all_chains().len(), ChainType::ALL.len());
        for chain in ChainType::ALL {
            assert_eq!(chain.config().id, chain);
        }
    }

    #[test]
    fn parses_wire_names_only() {
        assert_eq!("avalanche".parse::<ChainType>().unwrap(), ChainType::Avalanche);
        assert_eq!("xrp".parse::<ChainType>().unwrap(), ChainType::Xrp);
        assert!("Solana".parse::<ChainType>().is_err());
        assert!("bitcoin".parse::<ChainType>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ChainType::Polygon).unwrap();
        assert_eq!(json, "\"polygon\"");
        let parsed: ChainType = serde_json::from_str("\"sui\"").unwrap();
        assert_eq!(parsed, ChainType::Sui);
        assert!(serde_json::from_str::<ChainType>("\"near\"").is_err());
    }

    #[test]
    fn evm_chains_share_signature_scheme() {
        for chain in [ChainType::Ethereum, ChainType::Polygon, ChainType::Avalanche] {
            assert_eq!(chain.signature_scheme(), SignatureScheme::Eip191);
            assert_eq!(chain.config().agent_extension, "sol");
        }
        assert_eq!(ChainType::Solana.signature_scheme(), SignatureScheme::Ed25519Base58);
    }

    #[test]
    fn featured_chains_match_picker_defaults() {
        let featured: Vec<_> = all_chains().iter().filter(|c| c.featured).map(|c| c.id).collect();
        assert_eq!(
            featured,
            vec![ChainType::Solana, ChainType::Ethereum, ChainType::Sui, ChainType::Xrp]
        );
    }

    #[test]
    fn evm_address_forms_share_one_key() {
        let checksummed = "0x52908400098527886E0F7030069857D2E4169EE7";
        let canonical = "0x52908400098527886e0f7030069857d2e4169ee7";
        for form in [checksummed, canonical, &canonical[2..], &checksummed[2..], " 0X52908400098527886E0F7030069857D2E4169EE7 "] {
            assert_eq!(ChainType::Polygon.normalize_address(form), canonical, "{form}");
        }
        assert_eq!(canonical_evm_address("0x1234"), None);
    }

    #[test]
    fn normalizes_hex_addresses_only() {
        assert_eq!(
            ChainType::Ethereum.normalize_address(" 0xAbCd "),
            "0xabcd".to_string()
        );
        assert_eq!(ChainType::Sui.normalize_address("0xAB"), "0xab".to_string());
        assert_eq!(
            ChainType::Solana.normalize_address("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin"),
            "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string()
        );
    }
}
