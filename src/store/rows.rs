//! Mapping of PostgREST rows onto the records the calculator reads.
//!
//! Vote rows written by the sync carry `null` for votes Legistar left
//! blank. Those rows are dropped here rather than failing the fetch.

use crate::models::VoteRecord;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A row of the `votes` table as PostgREST returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteRow {
    #[serde(default, deserialize_with = "text_or_number")]
    pub matter_id: Option<String>,
    #[serde(default)]
    pub vote_value: Option<String>,
}

/// Keep only rows with both a matter and a recorded vote value.
pub fn vote_records(rows: Vec<VoteRow>) -> Vec<VoteRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let matter_id = row.matter_id.filter(|m| !m.trim().is_empty())?;
            let value = row.vote_value.filter(|v| !v.trim().is_empty())?;
            Some(VoteRecord::new(matter_id, value))
        })
        .collect()
}

/// Matter ids are stored as text by the sync but may come back numeric.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for matter_id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cityapi::Vote;
    use crate::models::Official;
    use crate::sync::rows::vote_row;

    fn decode(body: &str) -> Vec<VoteRecord> {
        let rows: Vec<VoteRow> = serde_json::from_str(body).unwrap();
        vote_records(rows)
    }

    #[test]
    fn test_null_vote_value_is_dropped() {
        let votes = decode(
            r#"[{"matter_id":"1","vote_value":"Yea"},{"matter_id":"7","vote_value":null}]"#,
        );
        assert_eq!(votes, vec![VoteRecord::new("1", "Yea")]);
    }

    #[test]
    fn test_blank_vote_row_from_sync_is_dropped() {
        let blank = vote_row(&Vote {
            vote_id: 3,
            person_id: 12,
            matter_id: 55,
            value: None,
            ..Vote::default()
        });
        let recorded = vote_row(&Vote {
            vote_id: 4,
            person_id: 12,
            matter_id: 56,
            value: Some("Nay".to_string()),
            ..Vote::default()
        });

        let rows: Vec<VoteRow> =
            serde_json::from_value(serde_json::json!([blank, recorded])).unwrap();
        assert_eq!(vote_records(rows), vec![VoteRecord::new("56", "Nay")]);
    }

    #[test]
    fn test_numeric_matter_id_and_extra_columns() {
        let votes = decode(
            r#"[
                {"matter_id": 102, "vote_value": "Nay", "person_id": 4, "vote_date": null},
                {"matter_id": "103", "vote_value": "Present", "created_at": "2024-01-01"}
            ]"#,
        );
        assert_eq!(
            votes,
            vec![
                VoteRecord::new("102", "Nay"),
                VoteRecord::new("103", "Present"),
            ]
        );
    }

    #[test]
    fn test_missing_or_null_matter_id_is_dropped() {
        let votes = decode(
            r#"[{"matter_id": null, "vote_value": "Yea"}, {"vote_value": "Nay"}, {"matter_id": "9", "vote_value": "  "}]"#,
        );
        assert!(votes.is_empty());
    }

    #[test]
    fn test_bad_matter_id_type_is_an_error() {
        let result: Result<Vec<VoteRow>, _> =
            serde_json::from_str(r#"[{"matter_id": true, "vote_value": "Yea"}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_official_view_rows() {
        let officials: Vec<Official> = serde_json::from_str(
            r#"[
                {"person_id": 7, "full_name": "Jane Roe", "district_number": 12, "party_affiliation": "Democratic", "email": "x@y"},
                {"person_id": 3, "full_name": null, "district_number": null, "party_affiliation": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(officials.len(), 2);
        assert_eq!(officials[0].district, Some(12));
        assert_eq!(officials[1].name, "");
        assert_eq!(officials[1].party, "");
    }
}
