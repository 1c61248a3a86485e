use anyhow::Result;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use truthlens_core::db::{self, SavedFilter};
use truthlens_core::presentation::{self, AgentKind};
use truthlens_core::schema::{Evidence, SavedFactCheck};
use truthlens_core::verdict::{classify_verdict, VerdictLabel};

pub struct VaultPaths {
    pub root: PathBuf,
    pub index_dir: PathBuf,
    pub checks_dir: PathBuf,
}

impl VaultPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            index_dir: root.join("00_Index"),
            checks_dir: root.join("FactChecks"),
            root,
        }
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.index_dir)?;
        fs::create_dir_all(&self.checks_dir)?;
        Ok(())
    }
}

/// Writes every saved check of `user_id` as a note, plus the index notes.
/// Returns the number of notes written.
pub fn build_vault(conn: &Connection, user_id: &str, vault_root: &Path) -> Result<usize> {
    let paths = VaultPaths::new(vault_root);
    paths.ensure()?;

    let checks = db::list_fact_checks(conn, user_id, &SavedFilter::default())?;

    // 1) One note per saved check, plus the MOC lines
    let mut index_lines: Vec<String> = Vec::new();
    index_lines.push("# MOC - Fact Checks".to_string());
    index_lines.push(String::new());
    index_lines.push("This index is generated. Do not edit manually.".to_string());
    index_lines.push(String::new());

    let mut verdict_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for label in [VerdictLabel::Verified, VerdictLabel::False, VerdictLabel::Unverified] {
        verdict_counts.insert(label.as_str(), 0);
    }

    for check in &checks {
        write_check_note(&paths, check)?;
        let label = classify_verdict(&check.verdict).label;
        index_lines.push(format!(
            "- [[FactChecks/{}|{}]] ({}, {}%)",
            check.id,
            index_title(check),
            label,
            check.confidence_level
        ));
        *verdict_counts.entry(label.as_str()).or_insert(0) += 1;
    }
    if checks.is_empty() {
        index_lines.push("_No saved fact-checks found._".to_string());
    }

    fs::write(paths.index_dir.join("MOC - Fact Checks.md"), index_lines.join("\n"))?;

    // 2) Verdict breakdown
    let mut verdict_lines: Vec<String> = Vec::new();
    verdict_lines.push("# MOC - Verdicts".to_string());
    verdict_lines.push(String::new());
    verdict_lines.push("This index is generated. Do not edit manually.".to_string());
    verdict_lines.push(String::new());
    verdict_lines.push(format!("- Total ({})", checks.len()));
    for (label, count) in &verdict_counts {
        verdict_lines.push(format!("- {label} ({count})"));
    }

    fs::write(paths.index_dir.join("MOC - Verdicts.md"), verdict_lines.join("\n"))?;

    info!(notes = checks.len(), root = %paths.root.display(), "vault written");
    Ok(checks.len())
}

fn index_title(check: &SavedFactCheck) -> String {
    let claim = check.claim.trim();
    if claim.is_empty() {
        return check.id.clone();
    }
    // Headings and wikilinks are single-line; `|` and `]]` are link syntax.
    claim
        .replace(['\r', '\n'], " ")
        .replace('|', "/")
        .replace("]]", "] ]")
}

fn write_check_note(paths: &VaultPaths, check: &SavedFactCheck) -> Result<()> {
    let note_path = paths.checks_dir.join(format!("{}.md", check.id));
    let data = &check.full_data;
    let summary = presentation::summarize(data);

    let mut md = String::new();
    md.push_str("---\n");
    md.push_str(&format!("id: {}\n", check.id));
    md.push_str(&format!("created_at: {}\n", check.created_at));
    md.push_str(&format!("verdict: {}\n", summary.verdict.label));
    md.push_str(&format!("confidence: {}\n", check.confidence_level));
    md.push_str("claim: |\n");
    md.push_str(&indent_yaml_block(&check.claim));
    md.push_str("raw_verdict: |\n");
    md.push_str(&indent_yaml_block(&check.verdict));
    md.push_str("---\n\n");

    md.push_str(&format!("# {}\n\n", index_title(check)));

    md.push_str("## Verdict\n");
    md.push_str(&format!(
        "- Label: **{}** ({})\n",
        summary.verdict.label, summary.verdict.description
    ));
    md.push_str(&format!("- Confidence: `{}%`\n", check.confidence_level));
    md.push_str(&format!("- Debate rounds: `{}`\n\n", data.debate_rounds));

    md.push_str("## Explanation\n");
    if data.synthesis_explanation.trim().is_empty() {
        md.push_str("_No explanation available._\n\n");
    } else {
        md.push_str(data.synthesis_explanation.trim());
        md.push_str("\n\n");
    }

    if let (Some(agents), Some(tally)) = (data.agent_outputs.as_deref(), summary.stance_tally) {
        md.push_str("## Agents\n");
        md.push_str(&format!(
            "- Supporting {} / Opposing {} / Neutral {}\n",
            tally.supporting, tally.opposing, tally.neutral
        ));
        if let Some(average) = summary.average_confidence {
            md.push_str(&format!("- Average confidence: `{average}%`\n"));
        }
        for agent in agents {
            let stance = presentation::stance_info(agent.stance);
            md.push_str(&format!(
                "- {} **{}** ({}): {} at {}%\n",
                AgentKind::from_name(&agent.agent_name).visual().glyph,
                agent.agent_name,
                agent.role,
                stance.label,
                presentation::to_percent(agent.confidence)
            ));
        }
        md.push('\n');
    }

    md.push_str(&format!("## Official Sources ({})\n", summary.official_count));
    write_evidence_list(&mut md, &data.evidence.official);
    md.push_str(&format!("## Social Sources ({})\n", summary.social_count));
    write_evidence_list(&mut md, &data.evidence.social);

    fs::write(note_path, md)?;
    Ok(())
}

fn write_evidence_list(md: &mut String, items: &[Evidence]) {
    if items.is_empty() {
        md.push_str("_None._\n\n");
        return;
    }
    for item in items {
        match &item.url {
            Some(url) => md.push_str(&format!("- [{}]({}) `{}`", item.title, url, item.kind)),
            None => md.push_str(&format!("- {} `{}`", item.title, item.kind)),
        }
        if !item.snippet.trim().is_empty() {
            md.push_str(&format!(": {}", item.snippet.trim()));
        }
        md.push('\n');
    }
    md.push('\n');
}

fn indent_yaml_block(s: &str) -> String {
    let mut out = String::new();
    for line in s.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    if out.is_empty() {
        out.push_str("  \n");
    }
    out
}
