// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prompt shaping for standalone UI generation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;

/// Kind of UI artefact requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UiKind {
    Component,
    Page,
    Styling,
}

impl UiKind {
    fn request_prefix(self) -> &'static str {
        match self {
            UiKind::Component => "",
            UiKind::Page => "Create a complete page layout for: ",
            UiKind::Styling => "Create CSS styles and Tailwind classes for: ",
        }
    }

    fn default_context(self) -> Option<&'static str> {
        match self {
            UiKind::Component => None,
            UiKind::Page => {
                Some("v0.dev inspired layout with sidebar, main content, and proper navigation")
            }
            UiKind::Styling => Some("v0.dev inspired design system"),
        }
    }
}

const COMPONENT_REQUIREMENTS: &str = "Requirements:
- Use TypeScript
- Use Tailwind CSS for styling
- Use shadcn/ui components where appropriate
- Make it responsive
- Add proper TypeScript types
- Include proper accessibility
- Use modern React patterns (hooks, functional components)
- Add smooth animations with Framer Motion
- Make it look like v0.dev with clean, modern design
- Use proper color schemes for light/dark mode
- Add subtle shadows and borders
- Make buttons and corners boxy (not rounded)
- Use proper spacing and typography";

/// Build the component brief sent to the generator.
///
/// An explicit `context` wins over the kind's default one.
pub fn build_component_prompt(prompt: &str, kind: UiKind, context: Option<&str>) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .or(kind.default_context());

    let mut out = format!(
        "Create a modern React component with the following requirements:\n\n{}{}\n\n{}\n\n",
        kind.request_prefix(),
        prompt,
        COMPONENT_REQUIREMENTS,
    );
    if let Some(context) = context {
        out.push_str("Context: ");
        out.push_str(context);
        out.push_str("\n\n");
    }
    out.push_str("Please generate a complete, production-ready component:");
    out
}

static EXPORTED_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+(?:default\s+)?(?:function\s+|const\s+)([A-Z][a-zA-Z0-9]*)").unwrap()
});

/// PascalCase names of exported functions and constants, in source order.
pub fn extract_components(code: &str) -> Vec<String> {
    EXPORTED_COMPONENT
        .captures_iter(code)
        .map(|caps| caps[1].to_string())
        .collect()
}
