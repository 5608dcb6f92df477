// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::chains::ChainType;
use crate::storage::ProjectType;

fn type_context(kind: ProjectType, chain: ChainType) -> String {
    match kind {
        ProjectType::Frontend => format!(
            "Generate a React frontend component for a {chain} dApp with the following features:\n\
             - Modern UI with Tailwind CSS\n\
             - Wallet connection functionality\n\
             - Responsive design\n\
             - Error handling\n\
             - Loading states\n\
             - TypeScript support"
        ),
        ProjectType::Agent => format!(
            "Generate an AI agent/smart contract for {chain} with the following features:\n\
             - On-chain logic implementation\n\
             - Security best practices\n\
             - Event emission\n\
             - Access control\n\
             - Gas optimization\n\
             - Comprehensive documentation"
        ),
    }
}

/// Wrap a user request with chain and project-type context for the
/// upstream generator.
pub fn build_enhanced_prompt(prompt: &str, kind: ProjectType, chain: ChainType) -> String {
    let config = chain.config();
    let name = config.name;
    let language = config.generation.language;
    let framework = config.generation.framework;

    format!(
        "{context}\n\n\
         Chain: {name} ({language})\n\
         Framework: {framework}\n\n\
         User Request: {prompt}\n\n\
         Requirements:\n\
         - Generate {kind} code for {name}\n\
         - Use {language} programming language\n\
         - Include proper wallet integration for {name}\n\
         - Add necessary imports and dependencies\n\
         - Include error handling and best practices\n\
         - Make the code production-ready\n\
         - Add comments explaining the functionality\n\n\
         Please generate the complete, working code:",
        context = type_context(kind, chain),
    )
}
