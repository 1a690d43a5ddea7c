//! Process-mining aggregation engine
//!
//! Two modes over the same ingested events:
//!
//! - **Transition aggregation** ([`transitions`]): deduplicate `(from, to)`
//!   pairs into [`Relationship`]s with occurrence counts, case membership and
//!   duration samples.
//! - **Path signatures** ([`paths`]): give every case a canonical signature,
//!   group cases by signature and rank the groups. The top group is the
//!   happy path.
//!
//! All state lives for one call. [`model::build_model`] runs both modes for an
//! update and returns an owned [`ProcessModel`]; nothing is cached between
//! calls.

pub mod group;
pub mod model;
pub mod paths;
pub mod stats;
pub mod transitions;

pub use group::{group_by, GroupedBy};
pub use model::{build_event_log_model, build_model, HappyPathSource, ProcessModel};
pub use paths::{
    chain_transitions, classify, classify_chronological, escape_label, happy_path_edges,
    rank_groups, signature_parts, Case, PathClassification, PathGroup, PATH_SEPARATOR,
    TRANSITION_SEPARATOR,
};
pub use transitions::{aggregate, Relationship, RelationshipMap, TransitionAccumulator, TransitionKey};
