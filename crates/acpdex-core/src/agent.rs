//! Domain types for registry agents
//!
//! These are the validated, strongly-typed records produced by the parser.
//! Field names double as the durable snapshot serialization format, so
//! renames here are breaking changes for persisted caches.

use serde::{Deserialize, Serialize};

/// One entity in the remote registry: a service/product provider with
/// offerings, stats, and status. Immutable after parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Upstream numeric id, if the record carried one
    pub id: Option<u64>,
    /// Display name; never empty and never the placeholder "Unknown"
    pub name: String,
    /// On-chain identity
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub profile_pic: String,
    /// Deduplicated by name; offerings-derived entries win over job-derived ones
    #[serde(default)]
    pub job_offerings: Vec<JobOffering>,
    #[serde(default)]
    pub stats: AgentStats,
    #[serde(default)]
    pub status: AgentStatus,
}

/// A priced unit of work an agent can perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOffering {
    pub name: String,
    /// USD price when known
    pub price: Option<f64>,
    pub price_type: String,
    /// Truncated to 200 characters at parse time
    #[serde(default)]
    pub description: String,
}

/// Upstream-reported performance metrics, all defaulted when absent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentStats {
    #[serde(default)]
    pub total_jobs: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub unique_buyers: u64,
    #[serde(default)]
    pub transaction_count: u64,
    /// Raw upstream timestamp; format is not contractual so it stays a string
    pub last_active: Option<String>,
    pub rating: Option<f64>,
}

/// Liveness flags
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentStatus {
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub graduated: bool,
}

impl Agent {
    /// Lowercased name + description + offering names/descriptions, the text
    /// every query path matches against.
    pub fn searchable_text(&self) -> String {
        let mut text = format!("{} {}", self.name, self.description);
        for offering in &self.job_offerings {
            text.push(' ');
            text.push_str(&offering.name);
            text.push(' ');
            text.push_str(&offering.description);
        }
        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_agent() -> Agent {
        Agent {
            id: Some(7),
            name: "Trading Analytics".to_string(),
            wallet_address: "0xAbC".to_string(),
            description: "Automated Trading Bot".to_string(),
            category: "defi".to_string(),
            cluster: String::new(),
            twitter: String::new(),
            profile_pic: String::new(),
            job_offerings: vec![JobOffering {
                name: "Signal Feed".to_string(),
                price: Some(4.2),
                price_type: "fixed".to_string(),
                description: "Hourly signals".to_string(),
            }],
            stats: AgentStats::default(),
            status: AgentStatus::default(),
        }
    }

    #[test]
    fn test_searchable_text_includes_offerings() {
        let text = sample_agent().searchable_text();
        assert!(text.contains("trading analytics"));
        assert!(text.contains("signal feed"));
        assert!(text.contains("hourly signals"));
    }

    #[test]
    fn test_agent_serde_round_trip() {
        let agent = sample_agent();
        let json = serde_json::to_string(&agent).unwrap();
        let back: Agent = serde_json::from_str(&json).unwrap();
        assert_eq!(agent, back);
    }

    #[test]
    fn test_agent_deserializes_with_missing_optional_fields() {
        let back: Agent = serde_json::from_str(r#"{"id": null, "name": "Minimal"}"#).unwrap();
        assert_eq!(back.name, "Minimal");
        assert!(back.job_offerings.is_empty());
        assert_eq!(back.stats.total_jobs, 0);
        assert!(!back.status.online);
    }
}
