//! Reduction of settled risk API payloads into one [`RiskResponse`].

use tracing::{debug, warn};

use super::payload::{best_effort_hits, RiskPayload, RiskResponse, RiskSourceResult};
use super::sources::ALL_SOURCES_ID;

/// Folds payloads into a unified response.
///
/// `payloads` pairs each requested source id with the payload received for
/// it, in the order the requests were submitted. Every requested source
/// yields at least one entry whatever the payload shape, and `total_hits`
/// is always the sum of the entries' hits. A unified breakdown answered for
/// the all-sources sentinel passes through as is, even when empty.
pub fn merge_payloads<I>(payloads: I) -> RiskResponse
where
    I: IntoIterator<Item = (String, RiskPayload)>,
{
    let mut merged = RiskResponse::default();

    for (requested, payload) in payloads {
        for entry in entries_for(&requested, payload, &mut merged.entity_name) {
            merged.total_hits += entry.hits;
            merged.sources.push(entry);
        }
    }

    merged
}

fn entries_for(
    requested: &str,
    payload: RiskPayload,
    entity_name: &mut String,
) -> Vec<RiskSourceResult> {
    match payload {
        RiskPayload::SingleSource(entry) => vec![entry],
        RiskPayload::Unified {
            entity_name: upstream_name,
            total_hits,
            sources,
        } => {
            if entity_name.is_empty() {
                if let Some(name) = upstream_name {
                    *entity_name = name;
                }
            }

            let listed: u64 = sources.iter().map(|entry| entry.hits).sum();
            if listed != total_hits {
                debug!(
                    source = requested,
                    reported = total_hits,
                    listed,
                    "unified payload total disagrees with its breakdown"
                );
            }

            if sources.is_empty() && requested != ALL_SOURCES_ID {
                vec![RiskSourceResult::placeholder(requested, total_hits)]
            } else {
                sources
            }
        }
        RiskPayload::OpaqueSources(value) => {
            let mut entry = RiskSourceResult::from_lenient(&value);
            if entry.source.is_empty() {
                entry.source = requested.to_string();
            }
            vec![entry]
        }
        RiskPayload::Unrecognized(raw) => {
            warn!(
                source = requested,
                payload = %raw,
                "risk payload has no recognizable shape; keeping a placeholder entry"
            );
            vec![RiskSourceResult::placeholder(requested, best_effort_hits(&raw))]
        }
    }
}
