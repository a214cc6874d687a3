//! Data access for officials and votes.
//!
//! The alignment calculator only sees the two traits below; the
//! PostgREST client is one implementation and tests supply in-memory ones.

pub mod postgrest;
pub mod rows;

use crate::models::{Official, VoteRecord};
use async_trait::async_trait;
use thiserror::Error;

pub use postgrest::PostgrestClient;

/// Errors from the hosted database.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Database returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode database response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of per-official vote records.
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn fetch_votes_by_actor(&self, actor_id: i64) -> Result<Vec<VoteRecord>, StoreError>;
}

/// Source of the current roster of officials.
#[async_trait]
pub trait OfficialStore: Send + Sync {
    async fn fetch_all_officials(&self) -> Result<Vec<Official>, StoreError>;
}
