use super::GeneratorError;
use crate::domain::ActionProposal;
use serde_json::Value;

/// Extract an action proposal from free-form model output. Tolerates fenced
/// code blocks and surrounding prose; the first well-formed JSON object wins.
pub fn parse_proposal(content: &str) -> Result<ActionProposal, GeneratorError> {
    let value = extract_json(content).ok_or_else(|| {
        GeneratorError::InvalidResponse("expected JSON object in model response".into())
    })?;
    proposal_from_value(value)
}

fn proposal_from_value(value: Value) -> Result<ActionProposal, GeneratorError> {
    match value {
        Value::String(text) => parse_proposal(&text),
        Value::Object(_) => {
            let proposal: ActionProposal = serde_json::from_value(value)
                .map_err(|source| GeneratorError::InvalidResponse(source.to_string()))?;
            if proposal.action.trim().is_empty() {
                return Err(GeneratorError::InvalidResponse(
                    "missing action field in proposal".into(),
                ));
            }
            Ok(proposal)
        }
        other => Err(GeneratorError::InvalidResponse(format!(
            "unsupported response type: {other}"
        ))),
    }
}

fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if trimmed.starts_with("```") {
        let stripped = trimmed.trim_start_matches("```json");
        let stripped = stripped.trim_start_matches("```JSON");
        let stripped = stripped.trim_start_matches("```");
        if let Some(end) = stripped.rfind("```") {
            let slice = &stripped[..end];
            if let Ok(value) = serde_json::from_str::<Value>(slice.trim()) {
                return Some(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            let candidate = &trimmed[start..=end];
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return Some(value);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TASK_COMPLETE;

    #[test]
    fn parses_bare_json_object() {
        let proposal = parse_proposal(r#"{"action":"web_search","params":{"query":"rust"}}"#)
            .expect("valid proposal");
        assert_eq!(proposal.action, "web_search");
        assert_eq!(proposal.params["query"], "rust");
    }

    #[test]
    fn parses_fenced_code_block() {
        let content = "Here is my decision:\n```json\n{\"action\": \"task_complete\", \"params\": {\"summary\": \"done\"}}\n```";
        let proposal = parse_proposal(content).expect("valid proposal");
        assert_eq!(proposal.action, TASK_COMPLETE);
    }

    #[test]
    fn parses_object_embedded_in_prose() {
        let content = "I will finish now. {\"action\": \"task_complete\"} Thank you.";
        let proposal = parse_proposal(content).expect("valid proposal");
        assert!(proposal.is_task_complete());
    }

    #[test]
    fn rejects_response_without_json() {
        let outcome = parse_proposal("no structured content here");
        assert!(matches!(outcome, Err(GeneratorError::InvalidResponse(_))));
    }

    #[test]
    fn rejects_empty_action() {
        let outcome = parse_proposal(r#"{"action": "  "}"#);
        assert!(matches!(outcome, Err(GeneratorError::InvalidResponse(_))));
    }
}
