use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InvestigationRequest {
    pub claim: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Evidence {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,                    // e.g. "Government", "Academic", "Reddit"
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_credibility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvidenceGroups {
    pub official: Vec<Evidence>,
    pub social: Vec<Evidence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Supporting,
    Opposing,
    Neutral,
    /// Any stance string the backend sends that is not one of the three above.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AgentOutput {
    pub agent_name: String,
    pub role: String,
    pub stance: Stance,
    pub analysis: String,
    pub confidence: f64,                 // 0.0 ..= 1.0
    pub evidence: Vec<String>,
    pub sources: Vec<String>,
    pub timestamp: String,               // ISO-8601
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_checked: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents_involved: Option<u32>,
}

/// Parsed body of a successful `POST /api/debating`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InvestigationResult {
    pub query: String,
    pub verdict: String,                 // free text: "True", "Misleading", ...
    pub confidence_level: String,        // "87%", "High", ...
    pub synthesis_explanation: String,
    pub debate_rounds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_outputs: Option<Vec<AgentOutput>>,
    pub evidence: EvidenceGroups,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_output: Option<String>,    // raw model text from older backends
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SavedFactCheck {
    pub id: String,
    pub user_id: String,
    pub claim: String,
    pub verdict: String,
    pub confidence_level: u8,            // classified percentage at save time
    pub created_at: String,              // RFC 3339, UTC
    pub full_data: InvestigationResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backend_payload_without_optional_sections_parses() {
        let body = json!({
            "status": "complete",
            "query": "Does E20 fuel damage car engines?",
            "verdict": "Unverified",
            "confidence_level": "50%",
            "synthesis_explanation": "No conclusive study.",
            "debate_rounds": 2,
            "agent_output": "VERDICT: Unverified",
            "evidence": {
                "official": [{"title": "Academic Database", "type": "Official", "snippet": "Peer-reviewed sources"}],
                "social": []
            }
        });

        let result: InvestigationResult = serde_json::from_value(body).unwrap();
        assert!(result.agent_outputs.is_none());
        assert!(result.metadata.is_none());
        assert_eq!(result.evidence.official[0].kind, "Official");
        assert!(result.evidence.social.is_empty());
        assert_eq!(result.agent_output.as_deref(), Some("VERDICT: Unverified"));
    }

    #[test]
    fn missing_evidence_is_rejected() {
        let body = json!({
            "query": "q",
            "verdict": "True",
            "confidence_level": "80%",
            "synthesis_explanation": "",
            "debate_rounds": 1
        });
        assert!(serde_json::from_value::<InvestigationResult>(body).is_err());
    }

    #[test]
    fn unknown_stance_maps_to_other() {
        let body = json!({
            "agent_name": "Critic",
            "role": "skeptic",
            "stance": "undecided",
            "analysis": "",
            "confidence": 0.4,
            "evidence": [],
            "sources": [],
            "timestamp": "2025-01-01T00:00:00Z"
        });
        let agent: AgentOutput = serde_json::from_value(body).unwrap();
        assert_eq!(agent.stance, Stance::Other);
    }
}
