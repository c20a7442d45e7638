//! Dependency graph data structures and the canonical store

pub mod edge;
pub mod issue;
pub mod node;
pub mod store;

pub use edge::{Confidence, EdgeId, EdgeKind, EdgeMeta, GraphEdge};
pub use issue::{GraphIssue, IssueKind, Severity};
pub use node::{canonical_path, EntrypointKind, GraphNode, NodeId, NodeKind, NodeMeta};
pub use store::{GraphStore, StoreMeta};
