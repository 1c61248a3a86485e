use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme: {value}")),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "spanish" | "es" => Ok(Language::Spanish),
            "french" | "fr" => Ok(Language::French),
            "german" | "de" => Ok(Language::German),
            _ => Err(anyhow::anyhow!("Unknown language: {value}")),
        }
    }
}

/// Section headings of the rendered report.
#[derive(Debug, Clone, Copy)]
pub struct Headings {
    pub analyzed_claim: &'static str,
    pub verdict: &'static str,
    pub confidence: &'static str,
    pub explanation: &'static str,
    pub agents: &'static str,
    pub official_sources: &'static str,
    pub social_sources: &'static str,
}

impl Language {
    pub fn headings(self) -> Headings {
        match self {
            Language::English => Headings {
                analyzed_claim: "Analyzed Claim",
                verdict: "Verdict",
                confidence: "Confidence",
                explanation: "Explanation",
                agents: "Agent Debate",
                official_sources: "Official Sources",
                social_sources: "Social Sources",
            },
            Language::Spanish => Headings {
                analyzed_claim: "Afirmación analizada",
                verdict: "Veredicto",
                confidence: "Confianza",
                explanation: "Explicación",
                agents: "Debate de agentes",
                official_sources: "Fuentes oficiales",
                social_sources: "Fuentes sociales",
            },
            Language::French => Headings {
                analyzed_claim: "Affirmation analysée",
                verdict: "Verdict",
                confidence: "Confiance",
                explanation: "Explication",
                agents: "Débat des agents",
                official_sources: "Sources officielles",
                social_sources: "Sources sociales",
            },
            Language::German => Headings {
                analyzed_claim: "Analysierte Behauptung",
                verdict: "Urteil",
                confidence: "Konfidenz",
                explanation: "Erklärung",
                agents: "Agentendebatte",
                official_sources: "Offizielle Quellen",
                social_sources: "Soziale Quellen",
            },
        }
    }
}

/// User display preferences. Loaded once and handed to whoever renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub language: Language,
}

impl Preferences {
    /// Reads `path`, or returns defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no saved preferences, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences: {}", path.display()))?;
        let prefs = toml::from_str(&raw)
            .with_context(|| format!("Invalid preferences file: {}", path.display()))?;
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write preferences: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(&dir.path().join("prefs.toml")).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.language, Language::English);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.toml");
        let prefs = Preferences {
            theme: Theme::Light,
            language: Language::German,
        };
        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path).unwrap(), prefs);
        assert_eq!(Preferences::load(&path).unwrap().language.headings().verdict, "Urteil");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "language = \"french\"\n").unwrap();
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.language, Language::French);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "theme = \"sepia\"\n").unwrap();
        assert!(Preferences::load(&path).is_err());
    }

    #[test]
    fn parse_from_cli_strings() {
        assert_eq!("LIGHT".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
        assert!("klingon".parse::<Language>().is_err());
    }
}
