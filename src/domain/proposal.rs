use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Sentinel action the model returns when it considers the task finished.
pub const TASK_COMPLETE: &str = "task_complete";

/// The structured decision object returned by the proposal generator.
/// Untrusted input: never acted on without validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionProposal {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
    #[serde(default)]
    pub params: Value,
}

impl ActionProposal {
    pub fn is_task_complete(&self) -> bool {
        self.action == TASK_COMPLETE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_with_defaulted_fields() {
        let proposal: ActionProposal =
            serde_json::from_value(json!({ "action": "task_complete" })).expect("valid proposal");
        assert!(proposal.is_task_complete());
        assert!(proposal.task_id.is_none());
        assert_eq!(proposal.params, Value::Null);
    }

    #[test]
    fn tool_action_is_not_complete() {
        let proposal: ActionProposal = serde_json::from_value(json!({
            "action": "web_search",
            "params": { "query": "series A fintech founders" }
        }))
        .expect("valid proposal");
        assert!(!proposal.is_task_complete());
        assert_eq!(proposal.params["query"], "series A fintech founders");
    }
}
