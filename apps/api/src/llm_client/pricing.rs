//! Cost estimation from backend token usage.
//!
//! Rates are per million tokens in USD and must match `MODEL`.
//! Change both together.

use crate::llm_client::TokenUsage;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// Published rates for gemini-2.5-flash (text input, text output).
pub const MODEL_PRICING: Pricing = Pricing {
    input_per_million: 0.30,
    output_per_million: 2.50,
};

impl Pricing {
    pub fn cost_usd(&self, usage: TokenUsage) -> f64 {
        (usage.prompt_tokens as f64 / TOKENS_PER_MILLION) * self.input_per_million
            + (usage.completion_tokens as f64 / TOKENS_PER_MILLION) * self.output_per_million
    }
}

/// Estimated USD cost of one call at [`MODEL_PRICING`].
pub fn calculate_cost(usage: TokenUsage) -> f64 {
    MODEL_PRICING.cost_usd(usage)
}
