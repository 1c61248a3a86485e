//! Cosmetic "agents are debating" animation.
//!
//! Frames are a pure function of elapsed time and know nothing about the
//! request they decorate; callers stop drawing when the request settles.

use std::time::Duration;

pub const ROTATION: Duration = Duration::from_millis(1500);
pub const FILL_TIME: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy)]
pub struct DebateAgent {
    pub name: &'static str,
    pub description: &'static str,
    pub messages: [&'static str; 3],
}

pub const DEBATE_AGENTS: [DebateAgent; 4] = [
    DebateAgent {
        name: "Fact-Finder",
        description: "Scans records",
        messages: [
            "is scanning government records...",
            "is analyzing research papers...",
            "is checking official databases...",
        ],
    },
    DebateAgent {
        name: "Pattern Detector",
        description: "Analyzes volume",
        messages: [
            "is analyzing social media volume...",
            "is tracking viral patterns...",
            "is measuring sentiment trends...",
        ],
    },
    DebateAgent {
        name: "Verifier",
        description: "Cross-references",
        messages: [
            "is cross-referencing sources...",
            "is validating evidence...",
            "is assessing credibility...",
        ],
    },
    DebateAgent {
        name: "Critic",
        description: "Assesses logic",
        messages: [
            "is challenging assumptions...",
            "is identifying biases...",
            "is reviewing consensus...",
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebateFrame {
    pub agent_index: usize,
    pub progress: f64,
    pub message: &'static str,
}

impl DebateFrame {
    pub fn agent(&self) -> &'static DebateAgent {
        &DEBATE_AGENTS[self.agent_index]
    }

    pub fn line(&self) -> String {
        format!("{} {}", self.agent().name, self.message)
    }
}

pub fn frame_at(elapsed: Duration) -> DebateFrame {
    let agent_index =
        (elapsed.as_millis() / ROTATION.as_millis()) as usize % DEBATE_AGENTS.len();
    let progress = (elapsed.as_secs_f64() / FILL_TIME.as_secs_f64() * 100.0).min(100.0);
    let messages = &DEBATE_AGENTS[agent_index].messages;
    let message = messages[(progress / 33.0).floor() as usize % messages.len()];
    DebateFrame {
        agent_index,
        progress,
        message,
    }
}
