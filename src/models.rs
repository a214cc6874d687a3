//! Data models for officials, votes and alignment results.
//!
//! Row types mirror the columns exposed by the `current_officials` view
//! and the `votes` table. Everything else the API serves is passed
//! through as raw JSON rows.

use serde::{Deserialize, Serialize};

/// A city official as exposed by the `current_officials` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Official {
    /// Person identifier.
    #[serde(rename = "person_id")]
    pub id: i64,
    /// Display name.
    #[serde(rename = "full_name", default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Council district (ward), if the official holds one.
    #[serde(rename = "district_number", default)]
    pub district: Option<i32>,
    /// Free-text party affiliation.
    #[serde(rename = "party_affiliation", default, deserialize_with = "null_as_empty")]
    pub party: String,
}

/// A recorded vote cast by an official on a matter.
///
/// Built from `votes` rows by the store; rows without a value never
/// become a `VoteRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteRecord {
    pub matter_id: String,
    #[serde(rename = "vote_value")]
    pub value: String,
}

impl VoteRecord {
    pub fn new(matter_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            matter_id: matter_id.into(),
            value: value.into(),
        }
    }
}

/// One entry of a voting-allies ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ally {
    pub official_id: i64,
    pub name: String,
    /// Serialized as `ward` for the existing frontend.
    #[serde(rename = "ward")]
    pub district: Option<i32>,
    pub party: String,
    /// Percentage of shared matters voted the same way, in [0, 100].
    pub alignment: f64,
    pub bloc: String,
}

/// Ranked allies plus the number of officials whose votes could not be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllyRanking {
    pub allies: Vec<Ally>,
    pub skipped: usize,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_from_view_row() {
        let row = r#"{"person_id": 7, "full_name": "Jane Roe", "district_number": 12, "party_affiliation": "Democratic", "email": "x@y"}"#;
        let official: Official = serde_json::from_str(row).unwrap();
        assert_eq!(official.id, 7);
        assert_eq!(official.name, "Jane Roe");
        assert_eq!(official.district, Some(12));
        assert_eq!(official.party, "Democratic");
    }

    #[test]
    fn test_official_null_party_and_district() {
        let row = r#"{"person_id": 3, "full_name": null, "district_number": null, "party_affiliation": null}"#;
        let official: Official = serde_json::from_str(row).unwrap();
        assert_eq!(official.name, "");
        assert_eq!(official.district, None);
        assert_eq!(official.party, "");
    }

    #[test]
    fn test_vote_record_serializes_column_name() {
        let json = serde_json::to_value(VoteRecord::new("101", "Yea")).unwrap();
        assert_eq!(json["matter_id"], "101");
        assert_eq!(json["vote_value"], "Yea");
    }

    #[test]
    fn test_ally_serializes_ward() {
        let ally = Ally {
            official_id: 1,
            name: "A".to_string(),
            district: Some(4),
            party: "Democratic".to_string(),
            alignment: 50.0,
            bloc: "Progressive Caucus".to_string(),
        };
        let json = serde_json::to_value(&ally).unwrap();
        assert_eq!(json["ward"], 4);
        assert_eq!(json["alignment"], 50.0);
        assert!(json.get("district").is_none());
    }
}
