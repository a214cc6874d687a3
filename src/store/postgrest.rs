//! Minimal PostgREST client.
//!
//! Speaks the PostgREST URL dialect (`col=eq.value`, `order=col.desc`,
//! `limit=n`) over reqwest, authenticating with the Supabase service key.

use super::rows::{self, VoteRow};
use super::{OfficialStore, StoreError, VoteStore};
use crate::models::{Official, VoteRecord};
use async_trait::async_trait;
use reqwest::{Method, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// View listing officials currently in office.
pub const OFFICIALS_VIEW: &str = "current_officials";
/// Table of individual votes, one row per (person, matter).
pub const VOTES_TABLE: &str = "votes";

const OFFICIAL_COLUMNS: &str = "person_id,full_name,district_number,party_affiliation";
const VOTE_COLUMNS: &str = "matter_id,vote_value";

/// Client for a Supabase project's `/rest/v1` endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    /// Create a client for `project_url` (without the `/rest/v1` suffix).
    pub fn new(project_url: &str, api_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a read query against a table or view.
    pub fn from(&self, table: &str) -> Query<'_> {
        Query {
            client: self,
            table: table.to_string(),
            params: Vec::new(),
        }
    }

    /// Insert a row and return the rows PostgREST echoes back.
    pub async fn insert(&self, table: &str, row: &Value) -> Result<Vec<Value>, StoreError> {
        let request = self.write_request(
            Method::POST,
            table,
            None,
            Some(row),
            "return=representation",
        )?;
        self.fetch_rows(request).await
    }

    /// Update rows where `column` equals `value`.
    pub async fn update(
        &self,
        table: &str,
        column: &str,
        value: &str,
        row: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let request = self.write_request(
            Method::PATCH,
            table,
            Some((column, value)),
            Some(row),
            "return=representation",
        )?;
        self.fetch_rows(request).await
    }

    /// Delete rows where `column` equals `value`.
    pub async fn delete(&self, table: &str, column: &str, value: &str) -> Result<(), StoreError> {
        let request = self.write_request(
            Method::DELETE,
            table,
            Some((column, value)),
            None,
            "return=minimal",
        )?;
        self.send(request).await.map(|_| ())
    }

    /// Insert or merge a row, resolving conflicts on `on_conflict` when given.
    pub async fn upsert(
        &self,
        table: &str,
        row: &Value,
        on_conflict: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut request = self.write_request(
            Method::POST,
            table,
            None,
            Some(row),
            "resolution=merge-duplicates,return=minimal",
        )?;
        if let Some(columns) = on_conflict {
            request
                .url_mut()
                .query_pairs_mut()
                .append_pair("on_conflict", columns);
        }
        self.send(request).await.map(|_| ())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn write_request(
        &self,
        method: Method,
        table: &str,
        filter: Option<(&str, &str)>,
        body: Option<&Value>,
        prefer: &str,
    ) -> Result<Request, StoreError> {
        let mut builder = self
            .http
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", prefer);

        if let Some((column, value)) = filter {
            builder = builder.query(&[(column, format!("eq.{}", value))]);
        }
        if let Some(row) = body {
            builder = builder.json(row);
        }

        Ok(builder.build()?)
    }

    async fn send(&self, request: Request) -> Result<String, StoreError> {
        debug!("{} {}", request.method(), request.url());

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status { status, body });
        }

        Ok(body)
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, request: Request) -> Result<Vec<T>, StoreError> {
        let body = self.send(request).await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// A read query being assembled against one table or view.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    client: &'a PostgrestClient,
    table: String,
    params: Vec<(String, String)>,
}

impl Query<'_> {
    /// Columns to return; accepts PostgREST embedding like `*, matters(*)`.
    pub fn select(mut self, columns: &str) -> Self {
        let columns: String = columns.chars().filter(|c| !c.is_whitespace()).collect();
        self.params.push(("select".to_string(), columns));
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Exclude rows where `column` is null (`col=not.is.null`).
    pub fn not_null(mut self, column: &str) -> Self {
        self.params
            .push((column.to_string(), "not.is.null".to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{}.{}", column, direction)));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    /// Build the GET request without sending it.
    pub fn build(&self) -> Result<Request, StoreError> {
        let client = self.client;
        Ok(client
            .http
            .get(client.table_url(&self.table))
            .query(&self.params)
            .header("apikey", &client.api_key)
            .bearer_auth(&client.api_key)
            .header("Accept", "application/json")
            .build()?)
    }

    /// Send the query and decode the returned rows.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, StoreError> {
        let request = self.build()?;
        self.client.fetch_rows(request).await
    }
}

#[async_trait]
impl VoteStore for PostgrestClient {
    async fn fetch_votes_by_actor(&self, actor_id: i64) -> Result<Vec<VoteRecord>, StoreError> {
        let raw: Vec<VoteRow> = self
            .from(VOTES_TABLE)
            .select(VOTE_COLUMNS)
            .eq("person_id", actor_id)
            .not_null("vote_value")
            .execute()
            .await?;
        Ok(rows::vote_records(raw))
    }
}

#[async_trait]
impl OfficialStore for PostgrestClient {
    async fn fetch_all_officials(&self) -> Result<Vec<Official>, StoreError> {
        self.from(OFFICIALS_VIEW)
            .select(OFFICIAL_COLUMNS)
            .execute()
            .await
    }
}
