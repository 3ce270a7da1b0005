use serde::{Deserialize, Serialize};

/// One unit of work pulled from the graph: an element id plus the text to
/// enrich. The id is Neo4j's `elementId()` and round-trips unchanged into
/// the batch write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// The output of enriching one record. Serialized as-is into the `UNWIND`
/// rows of the batch write; article jobs carry no summary and the field is
/// omitted from the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
