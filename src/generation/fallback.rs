// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static code returned when the upstream generator is unavailable.

use crate::chains::ChainType;
use crate::storage::ProjectType;

const FRONTEND_SOLANA: &str = include_str!("templates/frontend_solana.tsx.tmpl");
const FRONTEND_EVM: &str = include_str!("templates/frontend_evm.tsx.tmpl");
const FRONTEND_SUI: &str = include_str!("templates/frontend_sui.tsx.tmpl");
const FRONTEND_XRP: &str = include_str!("templates/frontend_xrp.tsx.tmpl");

const AGENT_SOLANA: &str = include_str!("templates/agent_solana.rs.tmpl");
const AGENT_EVM: &str = include_str!("templates/agent_evm.sol.tmpl");
const AGENT_SUI: &str = include_str!("templates/agent_sui.move.tmpl");
const AGENT_XRP: &str = include_str!("templates/agent_xrp.js.tmpl");

const CHAIN_NAME_SLOT: &str = "{{CHAIN_NAME}}";
const PROMPT_SLOT: &str = "{{PROMPT}}";

fn template(kind: ProjectType, chain: ChainType) -> &'static str {
    match (kind, chain) {
        (ProjectType::Frontend, ChainType::Solana) => FRONTEND_SOLANA,
        (ProjectType::Frontend, ChainType::Ethereum | ChainType::Polygon | ChainType::Avalanche) => {
            FRONTEND_EVM
        }
        (ProjectType::Frontend, ChainType::Sui) => FRONTEND_SUI,
        (ProjectType::Frontend, ChainType::Xrp) => FRONTEND_XRP,
        (ProjectType::Agent, ChainType::Solana) => AGENT_SOLANA,
        (ProjectType::Agent, ChainType::Ethereum | ChainType::Polygon | ChainType::Avalanche) => {
            AGENT_EVM
        }
        (ProjectType::Agent, ChainType::Sui) => AGENT_SUI,
        (ProjectType::Agent, ChainType::Xrp) => AGENT_XRP,
    }
}

/// Fallback source for `(kind, chain)` with the user's prompt embedded.
pub fn fallback_code(kind: ProjectType, chain: ChainType, prompt: &str) -> String {
    // The prompt goes in last so its text is never treated as a slot.
    template(kind, chain)
        .replace(CHAIN_NAME_SLOT, chain.config().name)
        .replace(PROMPT_SLOT, prompt)
}
