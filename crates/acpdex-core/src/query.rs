//! Read paths over a resident snapshot
//!
//! All functions here are pure and operate on whatever agent slice the
//! caller is holding (usually `cache.get_current().agents`) - they never
//! trigger a fetch. Matching is substring-based over the agent's searchable
//! text; snapshot order is always preserved, no ranking.

use crate::agent::Agent;

/// Keywords marking an agent as offering physical products; anything else
/// is a service. First match wins.
const PRODUCT_KEYWORDS: &[&str] = &[
    "3d print",
    "laser cut",
    "fabricat",
    "cnc",
    "mill",
    "shipping",
    "physical",
    "hardware",
    "manufacture",
    "printer",
    "maker",
    "craft",
    "build",
];

/// Agents split into product vs. service providers.
#[derive(Debug, Default)]
pub struct Categorized<'a> {
    pub products: Vec<&'a Agent>,
    pub services: Vec<&'a Agent>,
}

/// Bucket agents into products and services by keyword scan.
///
/// Order-preserving; every agent lands in exactly one bucket.
pub fn categorize_agents(agents: &[Agent]) -> Categorized<'_> {
    let mut buckets = Categorized::default();
    for agent in agents {
        let text = agent.searchable_text();
        if PRODUCT_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            buckets.products.push(agent);
        } else {
            buckets.services.push(agent);
        }
    }
    buckets
}

/// Case-insensitive substring search over names, descriptions, and
/// offerings. Returns matches in snapshot order.
pub fn search_agents<'a>(agents: &'a [Agent], query: &str) -> Vec<&'a Agent> {
    let query = query.to_lowercase();
    agents
        .iter()
        .filter(|agent| agent.searchable_text().contains(&query))
        .collect()
}

/// First agent whose wallet address matches, ignoring case.
pub fn find_by_wallet<'a>(agents: &'a [Agent], wallet: &str) -> Option<&'a Agent> {
    agents
        .iter()
        .find(|agent| agent.wallet_address.eq_ignore_ascii_case(wallet))
}
