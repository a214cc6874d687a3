//! Voting alignment between officials.
//!
//! Ranks the other members of the council by how often they voted the
//! same way as a target official on matters both of them voted on.

pub mod blocs;
pub mod calculator;

pub use blocs::BlocMap;
pub use calculator::{calculate_allies, AlignmentSettings};
