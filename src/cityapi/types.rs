//! Legistar response types.
//!
//! Field names follow the API's PascalCase JSON. Legistar omits or nulls
//! fields freely, so everything optional defaults.

use serde::{Deserialize, Serialize};

/// A piece of legislation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Matter {
    pub matter_id: i64,
    pub matter_guid: Option<String>,
    pub matter_file: Option<String>,
    pub matter_name: Option<String>,
    pub matter_title: Option<String>,
    pub matter_type_id: Option<i64>,
    pub matter_type_name: Option<String>,
    pub matter_status_id: Option<i64>,
    pub matter_status_name: Option<String>,
    pub matter_intro_date: Option<String>,
    pub matter_agenda_date: Option<String>,
    pub matter_passed_date: Option<String>,
    pub matter_enactment_date: Option<String>,
    pub matter_enactment_number: Option<String>,
    pub matter_requester: Option<String>,
    pub matter_sponsors: Vec<MatterSponsor>,
    pub matter_attachments: Vec<MatterAttachment>,
    pub matter_text: Option<String>,
    /// The API returns the version as a string.
    pub matter_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MatterSponsor {
    pub matter_sponsor_id: i64,
    pub matter_sponsor_guid: Option<String>,
    pub matter_sponsor_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MatterAttachment {
    pub matter_attachment_id: i64,
    pub matter_attachment_guid: Option<String>,
    pub matter_attachment_name: Option<String>,
    pub matter_attachment_hyperlink: Option<String>,
}

/// A council or committee meeting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Event {
    pub event_id: i64,
    pub event_guid: Option<String>,
    pub event_body_id: Option<i64>,
    pub event_body_name: Option<String>,
    pub event_date: Option<String>,
    pub event_time: Option<String>,
    pub event_location: Option<String>,
    pub event_agenda_file: Option<String>,
    pub event_minutes_file: Option<String>,
    pub event_video_url: Option<String>,
    pub event_items: Vec<EventItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EventItem {
    pub event_item_id: i64,
    pub event_item_guid: Option<String>,
    pub event_item_matter_id: Option<i64>,
    pub event_item_agenda_sequence: Option<i64>,
    pub event_item_agenda_number: Option<String>,
    pub event_item_action: Option<String>,
    pub event_item_action_text: Option<String>,
}

/// One person's vote on a matter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vote {
    #[serde(rename = "VoteId")]
    pub vote_id: i64,
    #[serde(rename = "VoteGuid")]
    pub vote_guid: Option<String>,
    #[serde(rename = "VotePersonId")]
    pub person_id: i64,
    #[serde(rename = "VotePersonName")]
    pub person_name: Option<String>,
    /// "Yea", "Nay", "Abstain", ...
    #[serde(rename = "VoteValueName")]
    pub value: Option<String>,
    #[serde(rename = "VoteEventId")]
    pub event_id: Option<i64>,
    #[serde(rename = "VoteMatterId")]
    pub matter_id: i64,
    #[serde(rename = "VoteDate")]
    pub date: Option<String>,
}

/// A committee or the full council.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Body {
    pub body_id: i64,
    pub body_guid: Option<String>,
    pub body_name: Option<String>,
    pub body_type_id: Option<i64>,
    pub body_type_name: Option<String>,
    pub body_meet_flag: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Person {
    pub person_id: i64,
    pub person_guid: Option<String>,
    pub person_first_name: Option<String>,
    pub person_last_name: Option<String>,
    pub person_full_name: Option<String>,
    pub person_email: Option<String>,
    #[serde(rename = "PersonWWW")]
    pub person_www: Option<String>,
}
