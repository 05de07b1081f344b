//! Agent Catalog Descriptors
//!
//! Display metadata for the dashboard's agent picker. The catalog lives in
//! the store and is seeded from this table at startup; the persona registry
//! is keyed by the same identifiers, which is what keeps the two in sync.

use serde::{Deserialize, Serialize};

/// One catalog row: what the picker shows for an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: String,
    pub name: String,
    pub group: String,
    pub description: String,
}

const BUILTIN_AGENTS: &[(&str, &str, &str, &str)] = &[
    ("agent_01_brainstorm", "Brainstorming", "Ideation", "Generates out-of-the-box ideas and disruptive concepts."),
    ("agent_02_validacao", "Validation", "Ideation", "Critiques ideas, surfaces market risks, suggests quick tests."),
    ("agent_03_mvp", "MVP Strategy", "Ideation", "Defines the minimum viable product and a simple roadmap."),
    ("agent_04_copy", "Copywriting", "Marketing", "Persuasive direct-response copy focused on conversion."),
    ("agent_05_roteiros", "Video Scripts", "Marketing", "Scripts for short and long-form video with strong hooks."),
    ("agent_06_social", "Social Media", "Marketing", "Editorial calendars, hashtags, and engagement strategy."),
    ("agent_07_marca", "Brand Strategy", "Marketing", "Positioning, brand archetypes, tone of voice, naming."),
    ("agent_08_uxcopy", "UX Writing", "Product", "Clear microcopy for buttons, errors, and user flows."),
    ("agent_09_automacao", "Automation", "Operations", "No-code automation flows with Zapier, Make, or n8n."),
    ("agent_10_prompts", "Prompt Engineering", "Operations", "Precise instructions for other AIs, fewer hallucinations."),
    ("agent_11_dados", "Data & KPIs", "Growth", "Interprets sales funnels and the metrics that matter."),
    ("agent_12_growth", "Growth Hacking", "Growth", "Fast acquisition experiments and low-cost retention."),
    ("agent_13_seo", "SEO", "Growth", "Content clusters, domain authority, on-page optimization."),
    ("agent_14_monetizacao", "Monetization", "Growth", "Subscription models, pricing tiers, upsell strategies."),
    ("agent_15_suporte", "Customer Success", "Operations", "Efficient, empathetic customer support answers."),
    ("agent_16_projetos", "Project Management", "Operations", "Agile task organization and MoSCoW prioritization."),
];

/// Descriptors for every built-in agent, in table order.
pub fn builtin_agent_descriptors() -> Vec<AgentDescriptor> {
    BUILTIN_AGENTS
        .iter()
        .map(|(id, name, group, description)| AgentDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            group: group.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona;

    #[test]
    fn test_catalog_matches_persona_registry() {
        let descriptors = builtin_agent_descriptors();
        assert_eq!(descriptors.len(), 16);

        // Every catalog entry must resolve to a specific persona, not the
        // fallback, otherwise the two tables have drifted apart.
        for descriptor in &descriptors {
            assert_ne!(
                persona::resolve(&descriptor.id),
                persona::FALLBACK_INSTRUCTION,
                "catalog id {} is not in the persona registry",
                descriptor.id
            );
        }
    }
}
