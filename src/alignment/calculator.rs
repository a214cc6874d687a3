//! Vote-overlap ranking.

use super::BlocMap;
use crate::models::{Ally, AllyRanking, VoteRecord};
use crate::store::{OfficialStore, StoreError, VoteStore};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Default number of allies returned.
pub const DEFAULT_ALLY_LIMIT: usize = 10;

/// Settings for one ranking run.
#[derive(Debug, Clone)]
pub struct AlignmentSettings {
    /// Maximum number of allies returned.
    pub limit: usize,
    pub blocs: BlocMap,
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_ALLY_LIMIT,
            blocs: BlocMap::default(),
        }
    }
}

impl From<&crate::config::AlignmentConfig> for AlignmentSettings {
    fn from(config: &crate::config::AlignmentConfig) -> Self {
        Self {
            limit: config.limit,
            blocs: BlocMap::from(config),
        }
    }
}

/// Rank every other official by agreement with `target_id`.
///
/// Failing to read the target's votes or the roster aborts the run. A
/// failure reading one comparison official's votes drops that official and
/// is reported through [`AllyRanking::skipped`].
pub async fn calculate_allies<V, O>(
    target_id: i64,
    votes: &V,
    officials: &O,
    settings: &AlignmentSettings,
) -> Result<AllyRanking, StoreError>
where
    V: VoteStore + ?Sized,
    O: OfficialStore + ?Sized,
{
    let target_votes = votes.fetch_votes_by_actor(target_id).await?;
    let target_map = vote_map(&target_votes);
    debug!(
        "Official {} has votes on {} matters",
        target_id,
        target_map.len()
    );

    let roster = officials.fetch_all_officials().await?;

    let mut allies = Vec::new();
    let mut skipped = 0;

    for other in roster.into_iter().filter(|o| o.id != target_id) {
        let other_votes = match votes.fetch_votes_by_actor(other.id).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping official {} ({}): {}", other.id, other.name, e);
                skipped += 1;
                continue;
            }
        };

        let Some(alignment) = alignment_percentage(&target_map, &other_votes) else {
            continue;
        };

        let bloc = settings.blocs.label_for(&other.party).to_string();
        allies.push(Ally {
            official_id: other.id,
            name: other.name,
            district: other.district,
            party: other.party,
            alignment,
            bloc,
        });
    }

    rank(&mut allies);
    allies.truncate(settings.limit);

    info!(
        "Computed {} allies for official {} ({} skipped)",
        allies.len(),
        target_id,
        skipped
    );

    Ok(AllyRanking { allies, skipped })
}

/// Map matter id to vote value. A later row for the same matter replaces
/// an earlier one.
pub fn vote_map(votes: &[VoteRecord]) -> HashMap<&str, &str> {
    votes
        .iter()
        .map(|v| (v.matter_id.as_str(), v.value.as_str()))
        .collect()
}

/// Percentage of shared matters on which `other` voted like the target.
///
/// Returns `None` when the two share no matters.
pub fn alignment_percentage(target: &HashMap<&str, &str>, other: &[VoteRecord]) -> Option<f64> {
    let mut total = 0usize;
    let mut matches = 0usize;

    for vote in other {
        if let Some(target_value) = target.get(vote.matter_id.as_str()) {
            total += 1;
            if *target_value == vote.value {
                matches += 1;
            }
        }
    }

    if total == 0 {
        return None;
    }

    Some(matches as f64 / total as f64 * 100.0)
}

/// Sort by alignment, highest first. Ties keep roster order.
fn rank(allies: &mut [Ally]) {
    allies.sort_by(|a, b| {
        b.alignment
            .partial_cmp(&a.alignment)
            .unwrap_or(Ordering::Equal)
    });
}
