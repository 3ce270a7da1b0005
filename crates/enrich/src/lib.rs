pub mod batcher;
pub mod openai;
pub mod traits;

pub use batcher::EmbeddingBatcher;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};
