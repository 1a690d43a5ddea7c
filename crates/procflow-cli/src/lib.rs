//! Procflow presentation layer and host stand-in.
//!
//! The engine crates know nothing about where tables come from or how graphs
//! are drawn. This crate supplies both ends:
//! - `binding` + `source` + `fetch`: a segmented host table and the
//!   incremental-fetch loop
//! - `settings`: the user-facing options and their enumeration contract
//! - `graph` + `layout` + `viewport`: the renderer-independent graph model,
//!   a layered size estimate and the pan/zoom transform
//! - `render`: Graphviz DOT and JSON handoff
//! - `visual`: one update cycle tying everything together

pub mod binding;
pub mod fetch;
pub mod graph;
pub mod layout;
pub mod render;
pub mod settings;
pub mod source;
pub mod viewport;
pub mod visual;

pub use graph::{build_graph, EdgeStyle, GraphEdge, GraphModel, GraphNode};
pub use settings::VisualSettings;
pub use visual::{UpdateOutcome, Visual, ZoomPolicy};
