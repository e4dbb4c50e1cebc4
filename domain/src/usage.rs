//! Token accounting
//!
//! Agents reached through a text pipe rarely report token counts, so usage
//! falls back to a word-based estimate of about 1.3 tokens per word.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;

const TOKENS_PER_WORD: f64 = 1.3;

/// Estimated token count of `text`
pub fn estimate_tokens(text: &str) -> u64 {
    let words = text.split_whitespace().count() as f64;
    (words * TOKENS_PER_WORD).ceil() as u64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Estimate usage from the prompt sent and the reply received
    pub fn estimate(prompt: &str, reply: &str) -> Self {
        Self::new(estimate_tokens(prompt), estimate_tokens(reply))
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

/// Usage per speaker, in speaker name order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLedger {
    by_speaker: BTreeMap<String, TokenUsage>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, speaker: &str, usage: TokenUsage) {
        *self.by_speaker.entry(speaker.to_string()).or_default() += usage;
    }

    pub fn get(&self, speaker: &str) -> Option<TokenUsage> {
        self.by_speaker.get(speaker).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenUsage)> {
        self.by_speaker.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn total(&self) -> TokenUsage {
        let mut total = TokenUsage::default();
        for usage in self.by_speaker.values() {
            total += *usage;
        }
        total
    }
}
