//! Client for the city clerk's Legistar web API.
//!
//! Covers the read endpoints the sync job needs: matters, their votes,
//! events with agenda items, bodies and persons.

pub mod client;
pub mod types;

pub use client::{CityApiError, CityClient, DEFAULT_BASE_URL};
pub use types::{Body, Event, EventItem, Matter, MatterSponsor, Person, Vote};
