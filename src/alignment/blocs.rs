//! Party-to-bloc labelling.

use std::collections::BTreeMap;

/// Label used when a party has no entry in the map.
pub const DEFAULT_BLOC: &str = "Independent";

/// Maps a party affiliation string to a coarse display bloc.
///
/// Matching is exact on the party string. Anything unmapped falls back to
/// the default label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocMap {
    labels: BTreeMap<String, String>,
    default_label: String,
}

impl Default for BlocMap {
    fn default() -> Self {
        Self::new(default_labels(), DEFAULT_BLOC)
    }
}

impl BlocMap {
    pub fn new(labels: BTreeMap<String, String>, default_label: impl Into<String>) -> Self {
        Self {
            labels,
            default_label: default_label.into(),
        }
    }

    /// Bloc label for a party affiliation.
    pub fn label_for(&self, party: &str) -> &str {
        self.labels
            .get(party)
            .map(String::as_str)
            .unwrap_or(&self.default_label)
    }
}

impl From<&crate::config::AlignmentConfig> for BlocMap {
    fn from(config: &crate::config::AlignmentConfig) -> Self {
        Self::new(config.blocs.clone(), config.default_bloc.clone())
    }
}

/// The stock party mapping.
pub fn default_labels() -> BTreeMap<String, String> {
    BTreeMap::from([("Democratic".to_string(), "Progressive Caucus".to_string())])
}
