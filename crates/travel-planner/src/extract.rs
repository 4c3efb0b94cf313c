//! Response Extractor
//!
//! Recovers a structured document from free-form model output by trying an
//! ordered list of strategies and keeping the first that yields a JSON object
//! or array.

use serde_json::Value;

use crate::error::{PlannerError, Result};

const FENCE: &str = "```";

/// One way of locating a document in text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// The whole text is the document
    Verbatim,
    /// Fenced code blocks, last block first
    FencedBlocks,
    /// First opening bracket to the last matching closing bracket
    BracketSpan,
}

impl ExtractionStrategy {
    pub const DEFAULT_ORDER: [Self; 3] = [Self::Verbatim, Self::FencedBlocks, Self::BracketSpan];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Verbatim => "verbatim",
            Self::FencedBlocks => "fenced_blocks",
            Self::BracketSpan => "bracket_span",
        }
    }

    fn attempt(self, text: &str) -> Option<Value> {
        match self {
            Self::Verbatim => parse_structured(text),
            Self::FencedBlocks => fenced_blocks(text)
                .into_iter()
                .rev()
                .find_map(|block| parse_structured(strip_language_tag(block))),
            Self::BracketSpan => bracket_span(text).and_then(parse_structured),
        }
    }
}

/// Ordered strategy list
#[derive(Clone, Debug)]
pub struct ResponseExtractor {
    strategies: Vec<ExtractionStrategy>,
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::with_strategies(ExtractionStrategy::DEFAULT_ORDER.to_vec())
    }
}

impl ResponseExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategies(strategies: Vec<ExtractionStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[ExtractionStrategy] {
        &self.strategies
    }

    pub fn extract(&self, text: &str) -> Result<Value> {
        self.extract_with_strategy(text).map(|(value, _)| value)
    }

    /// Extract and report which strategy succeeded
    pub fn extract_with_strategy(&self, text: &str) -> Result<(Value, ExtractionStrategy)> {
        for strategy in &self.strategies {
            if let Some(value) = strategy.attempt(text) {
                tracing::debug!(strategy = strategy.name(), "Extracted structured document");
                return Ok((value, *strategy));
            }
        }

        let preview: String = text.chars().take(120).collect();
        Err(PlannerError::Extraction(format!(
            "no strategy found a JSON object or array in: {}",
            preview
        )))
    }
}

fn parse_structured(text: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    (value.is_object() || value.is_array()).then_some(value)
}

/// Contents of fenced blocks in document order. An unterminated final fence
/// still yields its contents.
fn fenced_blocks(text: &str) -> Vec<&str> {
    text.split(FENCE).skip(1).step_by(2).collect()
}

/// Drop a language tag such as `json` from the fence line
fn strip_language_tag(block: &str) -> &str {
    let (first_line, rest) = block.split_once('\n').unwrap_or((block, ""));
    let tag = first_line.trim();

    if tag.is_empty() {
        return rest;
    }
    if tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return rest;
    }
    // Single-line block like "json{...}"
    let untagged = block.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    if untagged.trim_start().starts_with(['{', '[']) {
        return untagged;
    }
    block
}

fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
