use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use augment_core::config::Neo4jConfig;
use augment_core::{EnrichmentResult, Record};

use crate::store::{GraphError, GraphStore};

const PURCHASE_FETCH_TEMPLATE: &str = r#"
MATCH (c:Customer)-[sr:{START}]->(start)
WHERE sr.embedding IS NULL
MATCH (c)-[:{END}]->(end)
WITH sr, start, end
CALL {
    WITH start, end
    MATCH p=(start)-[:NEXT*]->(end)
    WITH nodes(p) AS txns
    UNWIND txns AS tx
    MATCH (tx)-[:HAS_ARTICLE]->(a)
    WITH collect(a.desc) AS data
    RETURN substring(reduce(out='', x IN data | out + ', ' + x), 1) AS text
}
WITH sr, text
RETURN elementId(sr) AS id, text
LIMIT {LIMIT}
"#;

const ARTICLE_FETCH_TEMPLATE: &str = r#"
MATCH (a:Article)
WHERE a.embedding IS NULL
RETURN elementId(a) AS id, a.desc AS text
LIMIT {LIMIT}
"#;

const PURCHASE_WRITE: &str = r#"
UNWIND $rows AS row
MATCH ()-[r]->() WHERE elementId(r) = row.id
SET r.summary = row.summary
WITH row, r
CALL db.create.setRelationshipVectorProperty(r, 'embedding', row.embedding)
"#;

const ARTICLE_WRITE: &str = r#"
UNWIND $rows AS row
MATCH (a) WHERE elementId(a) = row.id
CALL db.create.setNodeVectorProperty(a, 'embedding', row.embedding)
"#;

// ── Transaction API wire types ────────────────────────────────

#[derive(Serialize)]
struct TxRequest {
    statements: Vec<TxStatement>,
}

#[derive(Serialize)]
struct TxStatement {
    statement: String,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Deserialize)]
struct TxResult {
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Deserialize)]
struct TxRow {
    row: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct TxError {
    code: String,
    message: String,
}

/// Neo4j client over the HTTP transaction API. Every call is one
/// `tx/commit` round trip — a single transaction, no session held between
/// calls.
pub struct Neo4jClient {
    client: Client,
    uri: String,
    user: String,
    password: Option<String>,
    database: String,
    fetch_limit: usize,
}

impl Neo4jClient {
    pub fn new(config: &Neo4jConfig, fetch_limit: usize) -> Self {
        Self {
            client: Client::new(),
            uri: config.uri.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
            fetch_limit,
        }
    }

    async fn commit(
        &self,
        statement: String,
        parameters: serde_json::Value,
    ) -> Result<TxResponse, GraphError> {
        let url = format!("{}/db/{}/tx/commit", self.uri, self.database);
        debug!("tx/commit to {}", url);

        let body = TxRequest {
            statements: vec![TxStatement {
                statement,
                parameters,
            }],
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user, self.password.as_deref())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let resp: TxResponse = response.json().await?;
        if let Some(err) = resp.errors.first() {
            return Err(GraphError::Cypher {
                code: err.code.clone(),
                message: err.message.clone(),
            });
        }
        Ok(resp)
    }

    async fn fetch_records(&self, statement: String) -> Result<Vec<Record>, GraphError> {
        let resp = self.commit(statement, json!({})).await?;
        let result = resp
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GraphError::MalformedRow("empty result set".into()))?;
        rows_to_records(result.data)
    }

    async fn write_rows(
        &self,
        statement: &str,
        rows: &[EnrichmentResult],
    ) -> Result<(), GraphError> {
        let params = json!({ "rows": rows });
        self.commit(statement.to_string(), params).await?;
        Ok(())
    }
}

/// Relationship types are interpolated into the Cypher text (parameters
/// cannot stand in for a relationship type), so restrict them to
/// identifier characters.
fn validate_rel_type(season: &str) -> Result<&str, GraphError> {
    let ok = !season.is_empty()
        && season
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(season)
    } else {
        Err(GraphError::InvalidRelationshipType(season.to_string()))
    }
}

fn rows_to_records(data: Vec<TxRow>) -> Result<Vec<Record>, GraphError> {
    let mut records = Vec::with_capacity(data.len());
    for row in data {
        let id = row
            .row
            .first()
            .and_then(|v| v.as_str())
            .ok_or_else(|| GraphError::MalformedRow("missing id column".into()))?;
        let text = row
            .row
            .get(1)
            .and_then(|v| v.as_str())
            .ok_or_else(|| GraphError::MalformedRow(format!("missing text for id {id}")))?;
        records.push(Record::new(id, text));
    }
    Ok(records)
}

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn fetch_purchase_paths(
        &self,
        start_season: &str,
        end_season: &str,
    ) -> Result<Vec<Record>, GraphError> {
        let start = validate_rel_type(start_season)?;
        let end = validate_rel_type(end_season)?;
        let statement = PURCHASE_FETCH_TEMPLATE
            .replace("{START}", start)
            .replace("{END}", end)
            .replace("{LIMIT}", &self.fetch_limit.to_string());
        self.fetch_records(statement).await
    }

    async fn fetch_articles(&self) -> Result<Vec<Record>, GraphError> {
        let statement = ARTICLE_FETCH_TEMPLATE.replace("{LIMIT}", &self.fetch_limit.to_string());
        self.fetch_records(statement).await
    }

    async fn write_purchase_embeddings(
        &self,
        rows: &[EnrichmentResult],
    ) -> Result<(), GraphError> {
        self.write_rows(PURCHASE_WRITE, rows).await
    }

    async fn write_article_embeddings(&self, rows: &[EnrichmentResult]) -> Result<(), GraphError> {
        self.write_rows(ARTICLE_WRITE, rows).await
    }
}
