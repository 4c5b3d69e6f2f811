//! Static per-model price table and cost estimation.
//!
//! Rates are micro-USD per million tokens, so the arithmetic stays in
//! integers. Cost estimates are observability only; they never affect the
//! generated message.

/// Price table entry for one chat model.
#[derive(Debug, Clone, Copy)]
pub struct ModelPrice {
    pub model: &'static str,
    pub input_micro_usd_per_million: u64,
    pub output_micro_usd_per_million: u64,
}

/// Published per-token rates for the chat models this service uses.
const PRICE_TABLE: &[ModelPrice] = &[
    ModelPrice {
        model: "gpt-4-turbo-preview",
        input_micro_usd_per_million: 10_000_000,
        output_micro_usd_per_million: 30_000_000,
    },
    ModelPrice {
        model: "gpt-4-turbo",
        input_micro_usd_per_million: 10_000_000,
        output_micro_usd_per_million: 30_000_000,
    },
    ModelPrice {
        model: "gpt-4o",
        input_micro_usd_per_million: 2_500_000,
        output_micro_usd_per_million: 10_000_000,
    },
    ModelPrice {
        model: "gpt-4o-mini",
        input_micro_usd_per_million: 150_000,
        output_micro_usd_per_million: 600_000,
    },
    ModelPrice {
        model: "gpt-3.5-turbo",
        input_micro_usd_per_million: 500_000,
        output_micro_usd_per_million: 1_500_000,
    },
];

/// Looks up the price entry for `model`; `None` for unpriced models.
pub fn lookup(model: &str) -> Option<&'static ModelPrice> {
    PRICE_TABLE.iter().find(|entry| entry.model == model)
}

/// Estimated cost in micro-USD, or `None` when the model is not in the
/// table.
pub fn estimate_cost_micro_usd(
    model: &str,
    prompt_tokens: u64,
    completion_tokens: u64,
) -> Option<u64> {
    let entry = lookup(model)?;
    let prompt_cost = prompt_tokens.saturating_mul(entry.input_micro_usd_per_million) / 1_000_000;
    let completion_cost =
        completion_tokens.saturating_mul(entry.output_micro_usd_per_million) / 1_000_000;
    Some(prompt_cost.saturating_add(completion_cost))
}

/// Rough token count for a text: 1 token ≈ 4 characters, minimum 1. Used
/// only when the API response carries no usage block.
pub fn estimate_tokens(text: &str) -> u64 {
    ((text.len() as f64) / 4.0).ceil().max(1.0) as u64
}
