use owo_colors::{AnsiColors, OwoColorize};
use std::fmt::Write;
use truthlens_core::db::SavedStats;
use truthlens_core::preferences::{Preferences, Theme};
use truthlens_core::presentation::{self, AgentKind};
use truthlens_core::schema::{Evidence, InvestigationResult, SavedFactCheck};
use truthlens_core::verdict::classify_verdict;

fn style_color(style: &str, theme: Theme) -> AnsiColors {
    let (green, red, yellow) = match theme {
        Theme::Dark => (AnsiColors::BrightGreen, AnsiColors::BrightRed, AnsiColors::BrightYellow),
        Theme::Light => (AnsiColors::Green, AnsiColors::Red, AnsiColors::Yellow),
    };
    match style {
        "verified" | "green" => green,
        "false" | "red" => red,
        _ => yellow,
    }
}

fn heading(text: &str, theme: Theme) -> String {
    let color = match theme {
        Theme::Dark => AnsiColors::BrightCyan,
        Theme::Light => AnsiColors::Blue,
    };
    text.color(color).bold().to_string()
}

pub fn report(result: &InvestigationResult, prefs: &Preferences) -> String {
    let summary = presentation::summarize(result);
    let labels = prefs.language.headings();
    let theme = prefs.theme;
    let verdict_color = style_color(summary.verdict.style, theme);

    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(labels.analyzed_claim, theme));
    let _ = writeln!(out, "  \"{}\"\n", result.query);

    let _ = writeln!(out, "{}", heading(labels.verdict, theme));
    let _ = writeln!(
        out,
        "  {}  {}",
        summary.verdict.label.as_str().color(verdict_color).bold(),
        summary.verdict.description.dimmed()
    );
    let _ = writeln!(
        out,
        "  {}: {}% ({})\n",
        labels.confidence,
        summary.classification.confidence_percent,
        result.confidence_level
    );

    let _ = writeln!(out, "{}", heading(labels.explanation, theme));
    let _ = writeln!(out, "  {}\n", result.synthesis_explanation.trim());

    if let (Some(agents), Some(tally)) = (result.agent_outputs.as_deref(), summary.stance_tally) {
        let _ = writeln!(out, "{}", heading(labels.agents, theme));
        let _ = write!(
            out,
            "  {} supporting / {} opposing / {} neutral",
            tally.supporting.color(style_color("green", theme)),
            tally.opposing.color(style_color("red", theme)),
            tally.neutral.color(style_color("yellow", theme)),
        );
        match summary.average_confidence {
            Some(average) => {
                let _ = writeln!(out, ", avg {average}%");
            }
            None => out.push('\n'),
        }
        for agent in agents {
            let visual = AgentKind::from_name(&agent.agent_name).visual();
            let stance = presentation::stance_info(agent.stance);
            let _ = writeln!(
                out,
                "  {} {} [{}] {}%  {}",
                visual.glyph,
                agent.agent_name.bold(),
                stance.label.color(style_color(stance.style, theme)),
                presentation::to_percent(agent.confidence),
                agent.analysis.trim()
            );
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "{}",
        heading(&format!("{} ({})", labels.official_sources, summary.official_count), theme)
    );
    evidence_lines(&mut out, &result.evidence.official);
    let _ = writeln!(
        out,
        "{}",
        heading(&format!("{} ({})", labels.social_sources, summary.social_count), theme)
    );
    evidence_lines(&mut out, &result.evidence.social);

    out
}

fn evidence_lines(out: &mut String, items: &[Evidence]) {
    if items.is_empty() {
        let _ = writeln!(out, "  -");
        return;
    }
    for item in items {
        let _ = writeln!(out, "  • {} [{}]", item.title, item.kind);
        if !item.snippet.trim().is_empty() {
            let _ = writeln!(out, "    {}", item.snippet.trim());
        }
        if let Some(url) = &item.url {
            let _ = writeln!(out, "    {url}");
        }
    }
}

pub fn saved_line(check: &SavedFactCheck, theme: Theme) -> String {
    let info = classify_verdict(&check.verdict);
    format!(
        "{}  {:<10} {:>3}%  {}  {}",
        check.id,
        info.label.as_str().color(style_color(info.style, theme)),
        check.confidence_level,
        check.created_at,
        check.claim
    )
}

pub fn stats(stats: &SavedStats) -> String {
    format!(
        "Total Checks: {}\nVerified: {}\nFalse: {}",
        stats.total, stats.verified, stats.false_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use truthlens_core::preferences::Language;
    use truthlens_core::schema::{AgentOutput, EvidenceGroups, Stance};

    fn result() -> InvestigationResult {
        InvestigationResult {
            query: "Does E20 fuel damage engines?".to_string(),
            verdict: "Unverified".to_string(),
            confidence_level: "65%".to_string(),
            synthesis_explanation: "No official study confirms it.".to_string(),
            debate_rounds: 2,
            agent_outputs: Some(vec![AgentOutput {
                agent_name: "Counterpoint".to_string(),
                role: "skeptic".to_string(),
                stance: Stance::Opposing,
                analysis: "Reports are anecdotal.".to_string(),
                confidence: 0.5,
                evidence: Vec::new(),
                sources: Vec::new(),
                timestamp: "2025-11-02T10:00:00Z".to_string(),
            }]),
            evidence: EvidenceGroups {
                official: vec![Evidence {
                    title: "Ministry of Petroleum Advisory 2025".to_string(),
                    kind: "Government".to_string(),
                    snippet: "Lists compatible vehicle classes.".to_string(),
                    url: None,
                    source_credibility: None,
                    date: None,
                }],
                social: Vec::new(),
            },
            metadata: None,
            status: None,
            agent_output: None,
        }
    }

    #[test]
    fn report_uses_language_headings() {
        let prefs = Preferences {
            theme: Theme::Light,
            language: Language::Spanish,
        };
        let text = report(&result(), &prefs);
        assert!(text.contains("Veredicto"));
        assert!(text.contains("Fuentes oficiales"));
        assert!(text.contains("65%"));
        assert!(text.contains("Ministry of Petroleum Advisory 2025"));
        assert!(text.contains("avg 50%"));
    }

    #[test]
    fn report_without_agents_skips_breakdown() {
        let mut plain = result();
        plain.agent_outputs = None;
        let text = report(&plain, &Preferences::default());
        assert!(!text.contains("Agent Debate"));
        assert!(text.contains("Unverified"));
    }

    #[test]
    fn stats_block() {
        let text = stats(&SavedStats {
            total: 3,
            verified: 1,
            false_count: 2,
        });
        assert_eq!(text, "Total Checks: 3\nVerified: 1\nFalse: 2");
    }
}
