use super::{GeneratorError, ProposalGenerator, parser};
use crate::config::GeneratorSettings;
use crate::domain::{ActionProposal, TASK_COMPLETE, ToolDescriptor};
use crate::engine::CampaignState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Proposal generator backed by an OpenAI-compatible chat endpoint.
pub struct HttpProposalGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpProposalGenerator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn from_config(config: &GeneratorSettings) -> Self {
        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok());
        Self::new(config.endpoint.clone(), config.model.clone()).with_api_key(api_key)
    }

    fn http_error(&self, source: reqwest::Error) -> GeneratorError {
        GeneratorError::Http {
            endpoint: self.endpoint.clone(),
            source,
        }
    }
}

#[async_trait]
impl ProposalGenerator for HttpProposalGenerator {
    async fn generate(
        &self,
        state: &CampaignState,
        tools: &[ToolDescriptor],
        prompt: &str,
    ) -> Result<ActionProposal, GeneratorError> {
        let payload = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: compose_instructions(tools),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            stream: false,
        };

        info!(
            model = self.model.as_str(),
            campaign = %state.campaign.id,
            tools = tools.len(),
            "requesting action proposal"
        );

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| self.http_error(source))?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|source| self.http_error(source))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .ok_or_else(|| {
                GeneratorError::InvalidResponse("missing content in model response".into())
            })?;
        debug!("received proposal content from model");

        parser::parse_proposal(&content)
    }
}

fn compose_instructions(tools: &[ToolDescriptor]) -> String {
    let mut text = String::from(
        "You plan the next step of an outreach campaign. Respond with a single JSON object and nothing else.\n\
         To invoke a tool: {\"action\": \"<tool name>\", \"params\": { ... }}.\n",
    );
    text.push_str(&format!(
        "When the task needs no further tool work: {{\"action\": \"{TASK_COMPLETE}\", \"params\": {{ <task output> }}}}.\n"
    ));
    if tools.is_empty() {
        text.push_str("No tools are currently available; complete the task or explain the blocker in the output.\n");
    } else {
        text.push_str("Available tools:\n");
        for tool in tools {
            let description = tool.description.as_deref().unwrap_or("No description.");
            text.push_str(&format!("- {}: {}\n", tool.name, description));
        }
        text.push_str("Only name tools from this list and supply every required parameter.");
    }
    text
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn instructions_list_every_tool() {
        let tools = vec![
            ToolDescriptor::new("web_search").with_description("Search the web."),
            ToolDescriptor::new("read_file"),
        ];
        let instructions = compose_instructions(&tools);
        assert!(instructions.contains("- web_search: Search the web."));
        assert!(instructions.contains("- read_file: No description."));
        assert!(instructions.contains(TASK_COMPLETE));
    }

    #[test]
    fn empty_catalog_still_offers_completion() {
        let instructions = compose_instructions(&[]);
        assert!(instructions.contains("No tools are currently available"));
        assert!(instructions.contains(TASK_COMPLETE));
    }

    #[test]
    fn chat_request_serializes_openai_shape() {
        let payload = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage {
                role: "user",
                content: "next step".into(),
            }],
            stream: false,
        };
        let encoded = serde_json::to_value(&payload).expect("serializable");
        assert_eq!(
            encoded,
            json!({
                "model": "gpt-4o-mini",
                "messages": [{ "role": "user", "content": "next step" }],
                "stream": false
            })
        );
    }
}
