use std::sync::Arc;

use augment_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider, Message};

const SYSTEM_PROMPT: &str = r#"---Role---

You are a helpful assistant with expertise in fashion for a clothing company.

---Goal---

Your goal is to generate a summary of the products purchased by the customers and descriptions of each of the products.
Your summary should contain two sections -
Section 1 - Overall summary outlining the fashion preferences of the customer based on the purchases. Limit the summary to 3 sentences
Section 2 - highlight 3-5 individual purchases.

You should use the data provided in the section below as the primary context for generating the response.
If you don't know the answer or if the input data tables do not contain sufficient information to provide an answer, just say so.
Do not make anything up.

Data Description:
- Each Customer has an ID. Customer ID is a numeric value.
- Each Customer has purchased more than one clothing articles (products). Products have descriptions.
- The order of the purchases is very important. You should take into account the order when generating the summary.

Response:
---
# Overall Fashion Summary:



# Individual Purchase Details:
"#;

/// Produces a purchase-history summary for one record via a chat completion.
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    pub fn with_config(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self::new(provider, config.temperature, config.max_tokens)
    }

    /// One chat round trip: system prompt + the record's aggregated article
    /// descriptions as the user message.
    pub async fn summarize(&self, data: &str) -> Result<String, LlmError> {
        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(format!("Data:\n{data}")),
        ];
        self.provider
            .complete(messages, self.temperature, self.max_tokens)
            .await
    }
}
