//! Mapping of Legistar records onto database rows.
//!
//! Legistar ids become text columns (`matter_id`, `vote_id`, ...) so the
//! votes table can be joined against matters without casts.

use crate::cityapi::{Body, Event, EventItem, Matter, Vote};
use chrono::{DateTime, NaiveDateTime};
use serde_json::{json, Value};

/// Naive timestamp layout used by Legistar, e.g. `2024-01-15T00:00:00`.
const LEGISTAR_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Normalize an API date to RFC 3339.
///
/// Accepts RFC 3339 or Legistar's naive layout (taken as UTC). Empty or
/// unparseable input yields `None`.
pub fn parse_api_date(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.to_rfc3339());
    }

    NaiveDateTime::parse_from_str(raw, LEGISTAR_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc().to_rfc3339())
}

/// Shorten `s` to at most `max` characters, marking the cut with `...`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{}...", cut)
}

pub fn body_row(body: &Body) -> Value {
    json!({
        "body_id": body.body_id,
        "body_name": body.body_name,
        "body_type_id": body.body_type_id,
        "body_type_name": body.body_type_name,
        "body_meet_flag": body.body_meet_flag,
    })
}

/// Sponsors and attachments are stored as JSON text.
pub fn matter_row(matter: &Matter) -> Value {
    let sponsors = serde_json::to_string(&matter.matter_sponsors).unwrap_or_else(|_| "[]".into());
    let attachments =
        serde_json::to_string(&matter.matter_attachments).unwrap_or_else(|_| "[]".into());

    json!({
        "matter_id": matter.matter_id.to_string(),
        "matter_file": matter.matter_file,
        "matter_name": matter.matter_name,
        "matter_title": matter.matter_title,
        "matter_type_id": matter.matter_type_id,
        "matter_type_name": matter.matter_type_name,
        "matter_status_id": matter.matter_status_id,
        "matter_status_name": matter.matter_status_name,
        "matter_intro_date": parse_api_date(matter.matter_intro_date.as_deref()),
        "matter_agenda_date": parse_api_date(matter.matter_agenda_date.as_deref()),
        "matter_passed_date": parse_api_date(matter.matter_passed_date.as_deref()),
        "matter_enactment_date": parse_api_date(matter.matter_enactment_date.as_deref()),
        "matter_enactment_number": matter.matter_enactment_number,
        "matter_requester": matter.matter_requester,
        "matter_sponsors": sponsors,
        "matter_attachments": attachments,
        "matter_text": matter.matter_text,
        "matter_version": matter.matter_version,
    })
}

pub fn vote_row(vote: &Vote) -> Value {
    json!({
        "vote_id": vote.vote_id.to_string(),
        "matter_id": vote.matter_id.to_string(),
        "person_id": vote.person_id,
        "person_name": vote.person_name,
        "vote_value": vote.value,
        "vote_date": parse_api_date(vote.date.as_deref()),
        "vote_event_id": vote.event_id,
    })
}

pub fn event_row(event: &Event) -> Value {
    let items = serde_json::to_string(&event.event_items).unwrap_or_else(|_| "[]".into());

    json!({
        "event_id": event.event_id.to_string(),
        "event_body_id": event.event_body_id,
        "event_body_name": event.event_body_name,
        "event_date": parse_api_date(event.event_date.as_deref()),
        "event_time": event.event_time,
        "event_location": event.event_location,
        "event_agenda_file": event.event_agenda_file,
        "event_minutes_file": event.event_minutes_file,
        "event_video_url": event.event_video_url,
        "event_items": items,
    })
}

pub fn event_item_row(event_id: i64, item: &EventItem) -> Value {
    json!({
        "event_item_id": item.event_item_id.to_string(),
        "event_id": event_id.to_string(),
        "matter_id": item.event_item_matter_id.map(|id| id.to_string()),
        "item_agenda_sequence": item.event_item_agenda_sequence,
        "item_agenda_number": item.event_item_agenda_number,
        "item_action": item.event_item_action,
        "item_action_text": item.event_item_action_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cityapi::MatterSponsor;

    #[test]
    fn test_parse_naive_legistar_date() {
        assert_eq!(
            parse_api_date(Some("2024-01-15T00:00:00")),
            Some("2024-01-15T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_parse_rfc3339_date_keeps_offset() {
        assert_eq!(
            parse_api_date(Some("2024-03-02T10:30:00-06:00")),
            Some("2024-03-02T10:30:00-06:00".to_string())
        );
    }

    #[test]
    fn test_parse_bad_dates() {
        assert_eq!(parse_api_date(None), None);
        assert_eq!(parse_api_date(Some("")), None);
        assert_eq!(parse_api_date(Some("   ")), None);
        assert_eq!(parse_api_date(Some("01/15/2024")), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("a longer title here", 8), "a longer...");
        assert_eq!(truncate("ñandú ñandú", 5), "ñandú...");
    }

    #[test]
    fn test_matter_row() {
        let matter = Matter {
            matter_id: 55012,
            matter_file: Some("O2024-0001".to_string()),
            matter_intro_date: Some("2024-01-15T00:00:00".to_string()),
            matter_sponsors: vec![MatterSponsor {
                matter_sponsor_id: 1,
                matter_sponsor_guid: None,
                matter_sponsor_name: Some("Doe, Jane".to_string()),
            }],
            ..Matter::default()
        };

        let row = matter_row(&matter);

        assert_eq!(row["matter_id"], "55012");
        assert_eq!(row["matter_file"], "O2024-0001");
        assert_eq!(row["matter_intro_date"], "2024-01-15T00:00:00+00:00");
        assert!(row["matter_passed_date"].is_null());
        assert_eq!(row["matter_attachments"], "[]");

        let sponsors: Value = serde_json::from_str(row["matter_sponsors"].as_str().unwrap()).unwrap();
        assert_eq!(sponsors[0]["MatterSponsorName"], "Doe, Jane");
    }

    #[test]
    fn test_vote_row_uses_text_ids() {
        let vote = Vote {
            vote_id: 9,
            person_id: 44,
            person_name: Some("Doe, Jane".to_string()),
            value: Some("Nay".to_string()),
            event_id: Some(7),
            matter_id: 55012,
            ..Vote::default()
        };

        let row = vote_row(&vote);

        assert_eq!(row["vote_id"], "9");
        assert_eq!(row["matter_id"], "55012");
        assert_eq!(row["person_id"], 44);
        assert_eq!(row["vote_value"], "Nay");
        assert!(row["vote_date"].is_null());
    }

    #[test]
    fn test_event_item_row_without_matter() {
        let item = EventItem {
            event_item_id: 2,
            event_item_action_text: Some("Passed".to_string()),
            ..EventItem::default()
        };

        let row = event_item_row(1, &item);

        assert_eq!(row["event_item_id"], "2");
        assert_eq!(row["event_id"], "1");
        assert!(row["matter_id"].is_null());
        assert_eq!(row["item_action_text"], "Passed");
    }
}
