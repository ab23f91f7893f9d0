//! Upstream record normalization
//!
//! The upstream API is duck-typed: any field may be missing, null, or
//! renamed between deployments. Every raw shape here is fully defaulted and
//! validated exactly once into a strongly-typed [`Agent`]; downstream code
//! never re-derives defaults. A record that cannot be normalized is dropped,
//! never an error - one bad record must not fail a whole page.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::agent::{Agent, AgentStats, AgentStatus, JobOffering};

/// Job descriptions are capped at this many characters (codepoints).
const JOB_DESCRIPTION_MAX_CHARS: usize = 200;

/// Raw agent record as served by the upstream listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAgent {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub wallet_address: String,
    pub description: String,
    pub category: String,
    pub cluster: String,
    pub twitter_handle: String,
    pub profile_pic: String,
    pub offerings: Vec<RawOffering>,
    pub jobs: Vec<RawJob>,
    pub metrics: RawMetrics,
    pub transaction_count: u64,
    pub has_graduated: bool,
}

/// Entry in the upstream `offerings[]` list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawOffering {
    pub name: String,
    pub price_usd: Option<f64>,
    pub price: Option<f64>,
}

/// Richer entry in the upstream `jobs[]` list, with typed pricing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawJob {
    pub name: String,
    pub price: Option<f64>,
    pub price_v2: RawPriceV2,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPriceV2 {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Upstream `metrics{}` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMetrics {
    pub successful_job_count: u64,
    pub success_rate: f64,
    pub unique_buyer_count: u64,
    pub last_active_at: Option<String>,
    pub rating: Option<f64>,
    pub is_online: bool,
}

/// Normalize one raw upstream record into an [`Agent`].
///
/// Returns `None` when the record is not representable: a missing or empty
/// name, the literal placeholder `"Unknown"`, or a shape serde cannot make
/// sense of. Everything else gets safe defaults.
pub fn parse_agent(raw: Value) -> Option<Agent> {
    let raw: RawAgent = match serde_json::from_value(raw) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("Dropping malformed agent record: {}", e);
            return None;
        }
    };

    let name = raw.name.unwrap_or_default();
    if name.is_empty() || name == "Unknown" {
        return None;
    }

    let mut offerings: Vec<JobOffering> = raw
        .offerings
        .into_iter()
        .map(|o| JobOffering {
            name: o.name,
            price: o.price_usd.or(o.price),
            price_type: "fixed".to_string(),
            description: String::new(),
        })
        .collect();

    // Jobs carry truncated descriptions and typed pricing, but an offering
    // with the same name (exact, case-sensitive) wins.
    for job in raw.jobs {
        if offerings.iter().any(|o| o.name == job.name) {
            continue;
        }
        offerings.push(JobOffering {
            name: job.name,
            price: job.price,
            price_type: job.price_v2.kind.unwrap_or_else(|| "fixed".to_string()),
            description: truncate_chars(&job.description, JOB_DESCRIPTION_MAX_CHARS),
        });
    }

    Some(Agent {
        id: raw.id,
        name,
        wallet_address: raw.wallet_address,
        description: raw.description,
        category: raw.category,
        cluster: raw.cluster,
        twitter: raw.twitter_handle,
        profile_pic: raw.profile_pic,
        job_offerings: offerings,
        stats: AgentStats {
            total_jobs: raw.metrics.successful_job_count,
            success_rate: raw.metrics.success_rate,
            unique_buyers: raw.metrics.unique_buyer_count,
            transaction_count: raw.transaction_count,
            last_active: raw.metrics.last_active_at,
            rating: raw.metrics.rating,
        },
        status: AgentStatus {
            online: raw.metrics.is_online,
            graduated: raw.has_graduated,
        },
    })
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
