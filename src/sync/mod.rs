//! Legislative data sync.
//!
//! Pulls bodies, persons, matters (with their roll-call votes) and events
//! (with agenda items) from Legistar and upserts them into the database.
//! Each stage runs even if an earlier one failed; individual row failures
//! are logged and counted but never abort a stage.

pub mod rows;

use crate::cityapi::{Body, CityApiError, CityClient, Event, Matter, Person, Vote};
use crate::store::{PostgrestClient, StoreError};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const BODIES_TABLE: &str = "bodies";
pub const MATTERS_TABLE: &str = "matters";
pub const VOTES_TABLE: &str = "votes";
pub const EVENTS_TABLE: &str = "events";
pub const EVENT_ITEMS_TABLE: &str = "event_items";

/// Every table a sync writes to, in stage order.
pub const SYNCED_TABLES: [&str; 5] = [
    BODIES_TABLE,
    MATTERS_TABLE,
    VOTES_TABLE,
    EVENTS_TABLE,
    EVENT_ITEMS_TABLE,
];

/// Read side of the sync: where legislative records come from.
#[async_trait]
pub trait LegislativeSource: Send + Sync {
    async fn bodies(&self) -> Result<Vec<Body>, CityApiError>;
    async fn persons(&self) -> Result<Vec<Person>, CityApiError>;
    async fn matters(&self, params: &[(&str, &str)]) -> Result<Vec<Matter>, CityApiError>;
    async fn matter(&self, matter_id: i64) -> Result<Matter, CityApiError>;
    async fn votes(&self, matter_id: i64) -> Result<Vec<Vote>, CityApiError>;
    async fn events(&self, params: &[(&str, &str)]) -> Result<Vec<Event>, CityApiError>;
}

/// Write side of the sync.
#[async_trait]
pub trait RowSink: Send + Sync {
    async fn upsert_row(&self, table: &str, row: &Value) -> Result<(), StoreError>;
}

#[async_trait]
impl LegislativeSource for CityClient {
    async fn bodies(&self) -> Result<Vec<Body>, CityApiError> {
        self.get_bodies().await
    }

    async fn persons(&self) -> Result<Vec<Person>, CityApiError> {
        self.get_persons().await
    }

    async fn matters(&self, params: &[(&str, &str)]) -> Result<Vec<Matter>, CityApiError> {
        self.get_matters(params).await
    }

    async fn matter(&self, matter_id: i64) -> Result<Matter, CityApiError> {
        self.get_matter_by_id(matter_id).await
    }

    async fn votes(&self, matter_id: i64) -> Result<Vec<Vote>, CityApiError> {
        self.get_votes(matter_id).await
    }

    async fn events(&self, params: &[(&str, &str)]) -> Result<Vec<Event>, CityApiError> {
        self.get_events(params).await
    }
}

#[async_trait]
impl RowSink for PostgrestClient {
    async fn upsert_row(&self, table: &str, row: &Value) -> Result<(), StoreError> {
        self.upsert(table, row, conflict_key(table)).await
    }
}

/// Natural key each synced table is merged on.
fn conflict_key(table: &str) -> Option<&'static str> {
    match table {
        BODIES_TABLE => Some("body_id"),
        MATTERS_TABLE => Some("matter_id"),
        VOTES_TABLE => Some("vote_id"),
        EVENTS_TABLE => Some("event_id"),
        EVENT_ITEMS_TABLE => Some("event_item_id"),
        _ => None,
    }
}

/// Knobs for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Most recent matters to pull.
    pub matter_limit: usize,
    /// Most recent events to pull.
    pub event_limit: usize,
    /// Pause between per-matter and per-event requests.
    pub request_delay: Duration,
    /// Sync only these matters instead of the most recent ones.
    pub matter_ids: Vec<i64>,
    pub show_progress: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            matter_limit: 100,
            event_limit: 50,
            request_delay: Duration::from_millis(100),
            matter_ids: Vec::new(),
            show_progress: false,
        }
    }
}

/// Rows written and rows rejected for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub upserted: usize,
    pub failed: usize,
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub tables: BTreeMap<String, TableCount>,
    pub persons_seen: usize,
    /// Stages that could not fetch their source data.
    pub failed_stages: Vec<String>,
}

impl SyncSummary {
    pub fn count(&self, table: &str) -> TableCount {
        self.tables.get(table).copied().unwrap_or_default()
    }

    fn record(&mut self, table: &str, result: &Result<(), StoreError>) {
        let entry = self.tables.entry(table.to_string()).or_default();
        match result {
            Ok(()) => entry.upserted += 1,
            Err(_) => entry.failed += 1,
        }
    }
}

/// Runs the sync stages against a source and a sink.
pub struct Syncer<'a, S: ?Sized, K: ?Sized> {
    source: &'a S,
    sink: &'a K,
    options: SyncOptions,
    summary: SyncSummary,
}

impl<'a, S, K> Syncer<'a, S, K>
where
    S: LegislativeSource + ?Sized,
    K: RowSink + ?Sized,
{
    pub fn new(source: &'a S, sink: &'a K, options: SyncOptions) -> Self {
        Self {
            source,
            sink,
            options,
            summary: SyncSummary::default(),
        }
    }

    /// Run every stage in dependency order and return the tallies.
    pub async fn run(mut self) -> SyncSummary {
        info!("Starting sync with Legistar");

        // bodies first: matters and events reference them
        if let Err(e) = self.sync_bodies().await {
            self.stage_failed("bodies", &e);
        }
        if let Err(e) = self.sync_persons().await {
            self.stage_failed("persons", &e);
        }

        let matters = if self.options.matter_ids.is_empty() {
            self.sync_recent_matters().await
        } else {
            self.sync_selected_matters().await
        };
        if let Err(e) = matters {
            self.stage_failed("matters", &e);
        }

        if self.options.matter_ids.is_empty() {
            if let Err(e) = self.sync_recent_events().await {
                self.stage_failed("events", &e);
            }
        }

        info!("Sync complete");
        self.summary
    }

    fn stage_failed(&mut self, stage: &str, error: &CityApiError) {
        warn!("Error syncing {}: {}", stage, error);
        self.summary.failed_stages.push(stage.to_string());
    }

    async fn upsert(&mut self, table: &str, row: &Value, label: &str) {
        let result = self.sink.upsert_row(table, row).await;
        match &result {
            Ok(()) => debug!("Synced {}: {}", table, label),
            Err(e) => warn!("Failed to upsert {} {}: {}", table, label, e),
        }
        self.summary.record(table, &result);
    }

    async fn pause(&self) {
        if !self.options.request_delay.is_zero() {
            tokio::time::sleep(self.options.request_delay).await;
        }
    }

    async fn sync_bodies(&mut self) -> Result<(), CityApiError> {
        info!("Syncing bodies/committees...");
        let bodies = self.source.bodies().await?;
        info!("Found {} bodies", bodies.len());

        for body in &bodies {
            let label = body.body_name.clone().unwrap_or_default();
            self.upsert(BODIES_TABLE, &rows::body_row(body), &label)
                .await;
        }
        Ok(())
    }

    /// Persons are only reported; officials are curated separately.
    async fn sync_persons(&mut self) -> Result<(), CityApiError> {
        info!("Syncing persons...");
        let persons = self.source.persons().await?;
        info!("Found {} persons", persons.len());

        for person in &persons {
            debug!(
                "  - {} (ID: {})",
                person.person_full_name.as_deref().unwrap_or("<unnamed>"),
                person.person_id
            );
        }
        self.summary.persons_seen = persons.len();
        Ok(())
    }

    async fn sync_recent_matters(&mut self) -> Result<(), CityApiError> {
        info!("Syncing recent matters...");
        let top = self.options.matter_limit.to_string();
        let params = [("$top", top.as_str()), ("$orderby", "MatterIntroDate desc")];

        let mut matters = self.source.matters(&params).await?;
        info!("Found {} recent matters", matters.len());
        matters.truncate(self.options.matter_limit);

        let progress = self.progress_bar(matters.len());
        for matter in &matters {
            self.sync_matter(matter).await;
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
            self.pause().await;
        }
        if let Some(pb) = progress {
            pb.finish_with_message("Matters synced");
        }
        Ok(())
    }

    async fn sync_selected_matters(&mut self) -> Result<(), CityApiError> {
        info!("Syncing {} selected matters...", self.options.matter_ids.len());
        let ids = self.options.matter_ids.clone();

        for id in ids {
            let matter = self.source.matter(id).await?;
            self.sync_matter(&matter).await;
            self.pause().await;
        }
        Ok(())
    }

    async fn sync_matter(&mut self, matter: &Matter) {
        let label = format!(
            "{} - {}",
            matter.matter_file.as_deref().unwrap_or("?"),
            rows::truncate(matter.matter_title.as_deref().unwrap_or(""), 60)
        );
        self.upsert(MATTERS_TABLE, &rows::matter_row(matter), &label)
            .await;
        self.sync_votes_for_matter(matter.matter_id).await;
    }

    /// A failed vote fetch is logged; the matter itself is already stored.
    async fn sync_votes_for_matter(&mut self, matter_id: i64) {
        let votes = match self.source.votes(matter_id).await {
            Ok(votes) => votes,
            Err(e) => {
                warn!("Failed to fetch votes for matter {}: {}", matter_id, e);
                return;
            }
        };

        if votes.is_empty() {
            return;
        }
        debug!("Found {} votes for matter {}", votes.len(), matter_id);

        for vote in &votes {
            let label = format!("{}/{}", matter_id, vote.vote_id);
            self.upsert(VOTES_TABLE, &rows::vote_row(vote), &label)
                .await;
        }
    }

    async fn sync_recent_events(&mut self) -> Result<(), CityApiError> {
        info!("Syncing recent events...");
        let top = self.options.event_limit.to_string();
        let params = [("$top", top.as_str()), ("$orderby", "EventDate desc")];

        let mut events = self.source.events(&params).await?;
        info!("Found {} recent events", events.len());
        events.truncate(self.options.event_limit);

        for event in &events {
            let label = format!(
                "{} on {}",
                event.event_body_name.as_deref().unwrap_or("?"),
                event.event_date.as_deref().unwrap_or("?")
            );
            self.upsert(EVENTS_TABLE, &rows::event_row(event), &label)
                .await;

            for item in &event.event_items {
                let label = format!("{}/{}", event.event_id, item.event_item_id);
                self.upsert(
                    EVENT_ITEMS_TABLE,
                    &rows::event_item_row(event.event_id, item),
                    &label,
                )
                .await;
            }
            self.pause().await;
        }
        Ok(())
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.options.show_progress {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cityapi::EventItem;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        bodies: Vec<Body>,
        persons: Vec<Person>,
        matters: Vec<Matter>,
        votes: HashMap<i64, Vec<Vote>>,
        events: Vec<Event>,
        bodies_fail: bool,
        last_matter_params: Mutex<Vec<(String, String)>>,
    }

    fn unavailable() -> CityApiError {
        CityApiError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "down".to_string(),
        }
    }

    #[async_trait]
    impl LegislativeSource for FakeSource {
        async fn bodies(&self) -> Result<Vec<Body>, CityApiError> {
            if self.bodies_fail {
                return Err(unavailable());
            }
            Ok(self.bodies.clone())
        }

        async fn persons(&self) -> Result<Vec<Person>, CityApiError> {
            Ok(self.persons.clone())
        }

        async fn matters(&self, params: &[(&str, &str)]) -> Result<Vec<Matter>, CityApiError> {
            *self.last_matter_params.lock().unwrap() = params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Ok(self.matters.clone())
        }

        async fn matter(&self, matter_id: i64) -> Result<Matter, CityApiError> {
            self.matters
                .iter()
                .find(|m| m.matter_id == matter_id)
                .cloned()
                .ok_or_else(unavailable)
        }

        async fn votes(&self, matter_id: i64) -> Result<Vec<Vote>, CityApiError> {
            self.votes.get(&matter_id).cloned().ok_or_else(unavailable)
        }

        async fn events(&self, _params: &[(&str, &str)]) -> Result<Vec<Event>, CityApiError> {
            Ok(self.events.clone())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        rows: Mutex<Vec<(String, Value)>>,
        reject_table: Option<&'static str>,
    }

    #[async_trait]
    impl RowSink for RecordingSink {
        async fn upsert_row(&self, table: &str, row: &Value) -> Result<(), StoreError> {
            if self.reject_table == Some(table) {
                return Err(StoreError::Status {
                    status: reqwest::StatusCode::CONFLICT,
                    body: "duplicate".to_string(),
                });
            }
            self.rows
                .lock()
                .unwrap()
                .push((table.to_string(), row.clone()));
            Ok(())
        }
    }

    fn options() -> SyncOptions {
        SyncOptions {
            request_delay: Duration::ZERO,
            ..SyncOptions::default()
        }
    }

    fn matter(id: i64) -> Matter {
        Matter {
            matter_id: id,
            matter_file: Some(format!("O-{}", id)),
            ..Matter::default()
        }
    }

    fn vote(id: i64, matter_id: i64, person_id: i64) -> Vote {
        Vote {
            vote_id: id,
            matter_id,
            person_id,
            value: Some("Yea".to_string()),
            ..Vote::default()
        }
    }

    fn source() -> FakeSource {
        FakeSource {
            bodies: vec![Body {
                body_id: 1,
                body_name: Some("City Council".to_string()),
                ..Body::default()
            }],
            persons: vec![Person::default(), Person::default()],
            matters: vec![matter(10), matter(11)],
            votes: HashMap::from([(10, vec![vote(1, 10, 5), vote(2, 10, 6)])]),
            events: vec![Event {
                event_id: 3,
                event_items: vec![EventItem::default(), EventItem::default()],
                ..Event::default()
            }],
            ..FakeSource::default()
        }
    }

    #[tokio::test]
    async fn test_full_run_counts_every_table() {
        let source = source();
        let sink = RecordingSink::default();

        let summary = Syncer::new(&source, &sink, options()).run().await;

        assert_eq!(summary.count(BODIES_TABLE).upserted, 1);
        assert_eq!(summary.count(MATTERS_TABLE).upserted, 2);
        // votes for matter 11 cannot be fetched; its matter row is still written
        assert_eq!(summary.count(VOTES_TABLE).upserted, 2);
        assert_eq!(summary.count(EVENTS_TABLE).upserted, 1);
        assert_eq!(summary.count(EVENT_ITEMS_TABLE).upserted, 2);
        assert_eq!(summary.persons_seen, 2);
        assert!(summary.failed_stages.is_empty());

        let tables: Vec<String> = sink.rows.lock().unwrap().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(tables[0], BODIES_TABLE);
        assert_eq!(tables[1], MATTERS_TABLE);
        assert_eq!(tables[2], VOTES_TABLE);
    }

    #[tokio::test]
    async fn test_matter_query_uses_limit_and_order() {
        let source = source();
        let sink = RecordingSink::default();
        let opts = SyncOptions {
            matter_limit: 1,
            ..options()
        };

        let summary = Syncer::new(&source, &sink, opts).run().await;

        let params = source.last_matter_params.lock().unwrap().clone();
        assert_eq!(
            params,
            vec![
                ("$top".to_string(), "1".to_string()),
                ("$orderby".to_string(), "MatterIntroDate desc".to_string()),
            ]
        );
        // the fake ignores $top; the syncer still caps the batch
        assert_eq!(summary.count(MATTERS_TABLE).upserted, 1);
    }

    #[tokio::test]
    async fn test_failed_stage_does_not_stop_later_stages() {
        let source = FakeSource {
            bodies_fail: true,
            ..source()
        };
        let sink = RecordingSink::default();

        let summary = Syncer::new(&source, &sink, options()).run().await;

        assert_eq!(summary.failed_stages, vec!["bodies".to_string()]);
        assert_eq!(summary.count(BODIES_TABLE), TableCount::default());
        assert_eq!(summary.count(MATTERS_TABLE).upserted, 2);
        assert_eq!(summary.count(EVENTS_TABLE).upserted, 1);
    }

    #[tokio::test]
    async fn test_rejected_rows_are_counted() {
        let source = source();
        let sink = RecordingSink {
            reject_table: Some(VOTES_TABLE),
            ..RecordingSink::default()
        };

        let summary = Syncer::new(&source, &sink, options()).run().await;

        assert_eq!(
            summary.count(VOTES_TABLE),
            TableCount {
                upserted: 0,
                failed: 2
            }
        );
        assert_eq!(summary.count(MATTERS_TABLE).upserted, 2);
    }

    #[tokio::test]
    async fn test_selected_matters_only() {
        let source = source();
        let sink = RecordingSink::default();
        let opts = SyncOptions {
            matter_ids: vec![10],
            ..options()
        };

        let summary = Syncer::new(&source, &sink, opts).run().await;

        assert_eq!(summary.count(MATTERS_TABLE).upserted, 1);
        assert_eq!(summary.count(VOTES_TABLE).upserted, 2);
        assert_eq!(summary.count(EVENTS_TABLE).upserted, 0);

        let rows = sink.rows.lock().unwrap();
        let matter_row = rows.iter().find(|(t, _)| t == MATTERS_TABLE).unwrap();
        assert_eq!(matter_row.1["matter_id"], "10");
    }

    #[test]
    fn test_conflict_keys() {
        assert_eq!(conflict_key(VOTES_TABLE), Some("vote_id"));
        assert_eq!(conflict_key(EVENT_ITEMS_TABLE), Some("event_item_id"));
        assert_eq!(conflict_key("people"), None);
    }

    #[tokio::test]
    async fn test_unknown_selected_matter_fails_stage() {
        let source = source();
        let sink = RecordingSink::default();
        let opts = SyncOptions {
            matter_ids: vec![999],
            ..options()
        };

        let summary = Syncer::new(&source, &sink, opts).run().await;

        assert_eq!(summary.failed_stages, vec!["matters".to_string()]);
    }
}
