use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit-run pattern compiles"));

const DEFAULT_CONFIDENCE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictLabel {
    Verified,
    False,
    Unverified,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Verified => "Verified",
            VerdictLabel::False => "False",
            VerdictLabel::Unverified => "Unverified",
        }
    }
}

impl std::str::FromStr for VerdictLabel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "verified" => Ok(VerdictLabel::Verified),
            "false" => Ok(VerdictLabel::False),
            "unverified" => Ok(VerdictLabel::Unverified),
            _ => Err(anyhow::anyhow!("Unknown verdict label: {value}")),
        }
    }
}

/// Verdict filter as typed by a user: a label name or "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictFilter {
    All,
    Only(VerdictLabel),
}

impl VerdictFilter {
    pub fn label(self) -> Option<VerdictLabel> {
        match self {
            VerdictFilter::All => None,
            VerdictFilter::Only(label) => Some(label),
        }
    }
}

impl std::str::FromStr for VerdictFilter {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(VerdictFilter::All);
        }
        let label: VerdictLabel = value.parse().map_err(|_| {
            anyhow::anyhow!("Unknown verdict filter: {value} (expected verified, false, unverified or all)")
        })?;
        Ok(VerdictFilter::Only(label))
    }
}

impl std::fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictInfo {
    pub label: VerdictLabel,
    pub description: &'static str,
    pub style: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictClassification {
    pub label: VerdictLabel,
    pub confidence_percent: u8,
}

/// Maps free-text backend verdicts onto the three display labels.
///
/// Matching is by lower-cased substring, checked in order: "true"/"verified",
/// then "false"/"misleading". Everything else, including the empty string,
/// is `Unverified`. The word "unverified" never counts as a "verified" hit.
pub fn classify_verdict(verdict: &str) -> VerdictInfo {
    let normalized = verdict.to_lowercase();
    let affirmed = normalized.replace("unverified", " ");
    if affirmed.contains("true") || affirmed.contains("verified") {
        return VerdictInfo {
            label: VerdictLabel::Verified,
            description: "This claim is supported by credible evidence",
            style: "verified",
        };
    }
    if normalized.contains("false") || normalized.contains("misleading") {
        return VerdictInfo {
            label: VerdictLabel::False,
            description: "This claim is contradicted by evidence",
            style: "false",
        };
    }
    VerdictInfo {
        label: VerdictLabel::Unverified,
        description: "Insufficient evidence to verify this claim",
        style: "unverified",
    }
}

/// Converts a confidence string into a 0..=100 percentage.
///
/// The first ASCII digit run wins ("High (95%)" -> 95); keywords are only
/// consulted when there is no digit run. Runs above 100 saturate.
pub fn classify_confidence(level: &str) -> u8 {
    if let Some(run) = DIGIT_RUN.find(level) {
        return match run.as_str().parse::<u64>() {
            Ok(value) => value.min(100) as u8,
            Err(_) => 100, // longer than u64, still a digit run
        };
    }

    let normalized = level.to_lowercase();
    if normalized.contains("high") {
        95
    } else if normalized.contains("medium") {
        65
    } else if normalized.contains("low") {
        35
    } else {
        DEFAULT_CONFIDENCE
    }
}

pub fn classify(verdict: &str, confidence_level: &str) -> VerdictClassification {
    VerdictClassification {
        label: classify_verdict(verdict).label,
        confidence_percent: classify_confidence(confidence_level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_precedence() {
        assert_eq!(classify_verdict("This claim is TRUE").label, VerdictLabel::Verified);
        assert_eq!(
            classify_verdict("Rated Misleading by experts").label,
            VerdictLabel::False
        );
        assert_eq!(classify_verdict("").label, VerdictLabel::Unverified);
        assert_eq!(classify_verdict("inconclusive").label, VerdictLabel::Unverified);
        assert_eq!(classify_verdict("Unverified").label, VerdictLabel::Unverified);
        assert_eq!(
            classify_verdict("Verified, though unverified in places").label,
            VerdictLabel::Verified
        );
        // true is checked before false
        assert_eq!(classify_verdict("Partially True, partly false").label, VerdictLabel::Verified);
    }

    #[test]
    fn verdict_is_total_over_odd_input() {
        for input in ["   ", "\n\t", "ÉCHEC", "真実", "🤷", "FALSE!!!", "mIsLeAdInG"] {
            let info = classify_verdict(input);
            assert!(matches!(
                info.label,
                VerdictLabel::Verified | VerdictLabel::False | VerdictLabel::Unverified
            ));
        }
        assert_eq!(classify_verdict("mIsLeAdInG").style, "false");
    }

    #[test]
    fn confidence_prefers_digits() {
        assert_eq!(classify_confidence("High confidence: 87%"), 87);
        assert_eq!(classify_confidence("High (95%)"), 95);
        assert_eq!(classify_confidence("low, 12 of 40 sources"), 12);
        assert_eq!(classify_confidence("87%"), 87);
        assert_eq!(classify_confidence("0%"), 0);
    }

    #[test]
    fn confidence_keywords_and_default() {
        assert_eq!(classify_confidence("Medium"), 65);
        assert_eq!(classify_confidence("HIGH"), 95);
        assert_eq!(classify_confidence("low risk"), 35);
        assert_eq!(classify_confidence(""), 50);
        assert_eq!(classify_confidence("uncertain"), 50);
    }

    #[test]
    fn confidence_saturates() {
        assert_eq!(classify_confidence("250%"), 100);
        assert_eq!(classify_confidence("99999999999999999999999999"), 100);
    }

    #[test]
    fn label_parse_ignores_case() {
        assert_eq!("VERIFIED".parse::<VerdictLabel>().unwrap(), VerdictLabel::Verified);
        assert_eq!(" false ".parse::<VerdictLabel>().unwrap(), VerdictLabel::False);
        assert!("all".parse::<VerdictLabel>().is_err());
    }

    #[test]
    fn filter_accepts_all_and_rejects_typos() {
        assert_eq!("ALL".parse::<VerdictFilter>().unwrap(), VerdictFilter::All);
        assert_eq!(VerdictFilter::All.label(), None);
        assert_eq!(
            "Unverified".parse::<VerdictFilter>().unwrap().label(),
            Some(VerdictLabel::Unverified)
        );
        let err = "verifed".parse::<VerdictFilter>().unwrap_err();
        assert!(err.to_string().contains("verifed"));
        assert!("".parse::<VerdictFilter>().is_err());
    }
}
