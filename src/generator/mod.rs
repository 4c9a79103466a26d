mod http;
mod parser;

pub use http::HttpProposalGenerator;
pub use parser::parse_proposal;

use crate::domain::{ActionProposal, ToolDescriptor};
use crate::engine::CampaignState;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("proposal request to '{endpoint}' failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid proposal response: {0}")]
    InvalidResponse(String),
}

/// Produces the next action proposal for a task. External, unreliable and
/// non-deterministic: its output is untrusted input to the controller and
/// is always validated before any effect is permitted.
#[async_trait]
pub trait ProposalGenerator: Send + Sync {
    async fn generate(
        &self,
        state: &CampaignState,
        tools: &[ToolDescriptor],
        prompt: &str,
    ) -> Result<ActionProposal, GeneratorError>;
}
