use crate::schema::{AgentOutput, InvestigationResult, Stance};
use crate::verdict::{self, VerdictClassification, VerdictInfo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StanceTally {
    pub supporting: usize,
    pub opposing: usize,
    pub neutral: usize,
}

/// Everything the results view derives from one [`InvestigationResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub verdict: VerdictInfo,
    pub classification: VerdictClassification,
    /// `None` means the backend sent no agent breakdown at all.
    pub stance_tally: Option<StanceTally>,
    pub average_confidence: Option<u8>,
    pub official_count: usize,
    pub social_count: usize,
}

pub fn summarize(result: &InvestigationResult) -> ResultSummary {
    let agents = result.agent_outputs.as_deref();
    ResultSummary {
        verdict: verdict::classify_verdict(&result.verdict),
        classification: verdict::classify(&result.verdict, &result.confidence_level),
        stance_tally: agents.map(stance_tally),
        average_confidence: agents.and_then(average_confidence),
        official_count: result.evidence.official.len(),
        social_count: result.evidence.social.len(),
    }
}

pub fn stance_tally(agents: &[AgentOutput]) -> StanceTally {
    let mut tally = StanceTally::default();
    for agent in agents {
        match agent.stance {
            Stance::Supporting => tally.supporting += 1,
            Stance::Opposing => tally.opposing += 1,
            Stance::Neutral => tally.neutral += 1,
            Stance::Other => {}
        }
    }
    tally
}

/// Mean agent confidence as a 0..=100 percentage, or `None` for no agents.
pub fn average_confidence(agents: &[AgentOutput]) -> Option<u8> {
    if agents.is_empty() {
        return None;
    }
    let sum: f64 = agents.iter().map(|agent| agent.confidence).sum();
    let mean = sum / agents.len() as f64;
    Some(to_percent(mean))
}

/// Scales a 0..=1 ratio to a rounded percentage, clamped to 0..=100.
pub fn to_percent(ratio: f64) -> u8 {
    if !ratio.is_finite() {
        return 0;
    }
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StanceInfo {
    pub label: &'static str,
    pub style: &'static str,
}

pub fn stance_info(stance: Stance) -> StanceInfo {
    match stance {
        Stance::Supporting => StanceInfo {
            label: "Supporting",
            style: "green",
        },
        Stance::Opposing => StanceInfo {
            label: "Opposing",
            style: "red",
        },
        Stance::Neutral | Stance::Other => StanceInfo {
            label: "Neutral",
            style: "yellow",
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    FactChecker,
    Counterpoint,
    SocialPulse,
    BiasDetector,
    ExpertPanel,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualSpec {
    pub icon: &'static str,
    pub glyph: &'static str,
}

impl AgentKind {
    /// Exact, case-sensitive match on the backend's agent name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "FactChecker" => AgentKind::FactChecker,
            "Counterpoint" => AgentKind::Counterpoint,
            "SocialPulse" => AgentKind::SocialPulse,
            "BiasDetector" => AgentKind::BiasDetector,
            "ExpertPanel" => AgentKind::ExpertPanel,
            _ => AgentKind::Generic,
        }
    }

    pub fn visual(self) -> VisualSpec {
        match self {
            AgentKind::FactChecker => VisualSpec { icon: "shield", glyph: "🛡" },
            AgentKind::Counterpoint => VisualSpec { icon: "alert-circle", glyph: "⚠" },
            AgentKind::SocialPulse => VisualSpec { icon: "trending-up", glyph: "📈" },
            AgentKind::BiasDetector => VisualSpec { icon: "brain", glyph: "🧠" },
            AgentKind::ExpertPanel => VisualSpec { icon: "users", glyph: "👥" },
            AgentKind::Generic => VisualSpec { icon: "bot", glyph: "🤖" },
        }
    }
}
