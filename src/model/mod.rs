//! # Knowledge Graph Model
//!
//! Clean DTOs for the typed knowledge graph and its embedded chunks.
//! These types cross every boundary: store ↔ retrieval engine ↔ caller.
//!
//! Design rule: this module is pure data with no I/O, state or async.

pub mod node;
pub mod edge;
pub mod chunk;
pub mod path;
pub mod subgraph;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId};
pub use edge::{Edge, EdgeId, Direction};
pub use chunk::{Chunk, ChunkId, cosine_similarity};
pub use path::MatchedPath;
pub use subgraph::Subgraph;
pub use value::Value;
pub use property_map::{PropertyMap, property_map};
