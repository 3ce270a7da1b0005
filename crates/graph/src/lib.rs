pub mod neo4j;
pub mod store;

pub use neo4j::Neo4jClient;
pub use store::{GraphError, GraphStore};
