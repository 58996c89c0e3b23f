//! Extraction of observable signals from free-text agent answers.
//!
//! Confidence is derived from the text itself (length, assertive or hedging
//! wording, mentioned risks) and from how many backend attempts were spent.

use crate::core::agent::AgentId;
use crate::orchestration::value_objects::{AgentResponse, Blocker, Decision, Insight, Severity};
use regex::Regex;
use std::sync::LazyLock;

const MAX_INSIGHTS: usize = 5;
const MAX_DECISIONS: usize = 3;
const MAX_BLOCKERS: usize = 3;
const MIN_INSIGHT_CHARS: usize = 20;

const BASE_CONFIDENCE: f64 = 0.65;
const MIN_CONFIDENCE: f64 = 0.4;
const MAX_CONFIDENCE: f64 = 0.9;
const LONG_ANSWER_CHARS: usize = 500;
const RETRY_PENALTY: f64 = 0.05;

static INSIGHT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(recommend|suggest|should|must|important|need to|recomend|suger|importante|deve|precisa)").ok()
});

static DECISION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:recommend using|suggest implementing|choose|opt for|decide on|best option|recomendo usar|sugiro implementar|escolher|optar)\s*:\s*([^.\n]+)",
    )
    .ok()
});

static NUMBERED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+[.)]\s*([^.\n]+)").ok());

static LIST_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[\s\-\*\d\.\)]+").ok());

static HIGH_SEVERITY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(critical|severe|urgent|blocker|crítico|grave|urgente|bloqueio)").ok()
});

static MEDIUM_SEVERITY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(important|significant|attention|importante|significativo|atenção)").ok()
});

static ASSERTIVE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(certainly|definitely|clearly|certeza|definitivamente|claramente)\b").ok()
});

static HEDGING: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(maybe|perhaps|possibly|it depends|talvez|possivelmente|depende)\b").ok()
});

const RISK_KEYWORDS: &[&str] = &[
    "risk", "problem", "challenge", "caution", "concern", "blocker", "vulnerab", "risco",
    "problema", "desafio", "cuidado", "bloqueio", "riesgo",
];

fn is_match(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|r| r.is_match(text))
}

/// First capture group of every match.
fn captures(re: &LazyLock<Option<Regex>>, text: &str) -> Vec<String> {
    re.as_ref()
        .map(|r| {
            r.captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Signals extracted from one answer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseAnalysis {
    pub insights: Vec<String>,
    pub decisions: Vec<String>,
    pub blockers: Vec<(String, Severity)>,
    pub confidence: f64,
}

impl ResponseAnalysis {
    /// Parse an answer obtained after `attempts` backend calls.
    pub fn parse(content: &str, attempts: u32) -> Self {
        Self {
            insights: extract_insights(content),
            decisions: extract_decisions(content),
            blockers: extract_blockers(content),
            confidence: score_confidence(content, attempts),
        }
    }

    /// Attach the findings to a response, attributing them to `agent_id`.
    pub fn apply_to(self, response: &mut AgentResponse) {
        let agent_id: &AgentId = &response.agent_id;
        response.insights = self
            .insights
            .into_iter()
            .map(|text| Insight {
                agent_id: agent_id.clone(),
                text,
            })
            .collect();
        response.decisions = self
            .decisions
            .into_iter()
            .map(|text| Decision {
                agent_id: agent_id.clone(),
                text,
            })
            .collect();
        response.blockers = self
            .blockers
            .into_iter()
            .map(|(text, severity)| Blocker {
                agent_id: agent_id.clone(),
                text,
                severity,
            })
            .collect();
        response.confidence = self.confidence;
    }
}

pub fn extract_insights(content: &str) -> Vec<String> {
    let mut insights: Vec<String> = content
        .lines()
        .filter(|line| is_match(&INSIGHT, line))
        .map(|line| strip_list_marker(line))
        .filter(|line| line.chars().count() > MIN_INSIGHT_CHARS)
        .take(MAX_INSIGHTS)
        .collect();

    if insights.is_empty() {
        insights = captures(&NUMBERED, content).into_iter().take(3).collect();
    }
    insights
}

fn strip_list_marker(line: &str) -> String {
    match LIST_MARKER.as_ref() {
        Some(re) => re.replace(line, "").trim().to_string(),
        None => line.trim().to_string(),
    }
}

pub fn extract_decisions(content: &str) -> Vec<String> {
    captures(&DECISION, content)
        .into_iter()
        .take(MAX_DECISIONS)
        .collect()
}

pub fn extract_blockers(content: &str) -> Vec<(String, Severity)> {
    content
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            RISK_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|line| {
            let text = line.trim().to_string();
            let severity = assess_severity(&text);
            (text, severity)
        })
        .take(MAX_BLOCKERS)
        .collect()
}

pub fn assess_severity(text: &str) -> Severity {
    if is_match(&HIGH_SEVERITY, text) {
        Severity::High
    } else if is_match(&MEDIUM_SEVERITY, text) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Confidence in `[0.4, 0.9]` from observable signals.
pub fn score_confidence(content: &str, attempts: u32) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if content.chars().count() > LONG_ANSWER_CHARS {
        confidence += 0.1;
    }
    if is_match(&ASSERTIVE, content) {
        confidence += 0.1;
    }
    if is_match(&HEDGING, content) {
        confidence -= 0.1;
    }
    let lower = content.to_lowercase();
    if ["risk", "problem", "risco", "problema"].iter().any(|k| lower.contains(k)) {
        confidence -= 0.05;
    }
    confidence -= RETRY_PENALTY * f64::from(attempts.saturating_sub(1));
    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
