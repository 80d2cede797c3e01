//! Transformer retry state machine (spec §4.3, §9): `S0 EXTRACT -> S1 PARSE
//! -> S2 VALIDATE -> S3 RETRY -> S4 DONE / S5 FAILED`, written as an
//! explicit `enum` with a `step()` method that consumes itself and returns
//! the next state. No recursion — the driving loop in `lib.rs` is what
//! advances the machine, which keeps the "at most 3 LLM calls" invariant
//! visible at a single call site rather than buried in a call stack.

use crate::json_recovery;
use crate::llm_provider::{ImagePage, LlmProvider, LlmRequest};
use crate::prompts::{self, PromptKind};
use crate::schema::{self, ValidatedBatch};
use disclosure_core::{SourceFormat, Trade, TransformError};
use serde_json::Value;

/// Hard cap on LLM calls per invocation (spec §4.3 invariant (b), §8).
pub const MAX_ATTEMPTS: u32 = 3;

pub struct ExtractionResult {
    pub confidence: f64,
    pub trades: Vec<Trade>,
    pub row_errors: Vec<String>,
    pub attempts_used: u32,
    pub source_format: SourceFormat,
}

pub struct TransformerContext<'a> {
    pub provider: &'a dyn LlmProvider,
    pub prompt_kind: PromptKind,
    pub body_text: String,
    pub images: Vec<ImagePage>,
    pub source_url: String,
}

pub enum TransformerState {
    Extract { attempt: u32, errors: Vec<String> },
    Parse { attempt: u32, errors: Vec<String>, raw_response: String },
    Validate { attempt: u32, errors: Vec<String>, parsed: Value },
    Retry { attempt: u32, errors: Vec<String> },
    Done { result: ExtractionResult },
    Failed { error: TransformError },
}

impl TransformerState {
    pub fn initial() -> Self {
        TransformerState::Extract { attempt: 1, errors: Vec::new() }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransformerState::Done { .. } | TransformerState::Failed { .. })
    }

    /// Consumes `self`, performs whatever I/O that state requires, and
    /// returns the next state. Call in a loop until `is_terminal()`.
    pub async fn step(self, ctx: &TransformerContext<'_>) -> TransformerState {
        match self {
            TransformerState::Extract { attempt, errors } => {
                let correction = if errors.is_empty() { None } else { Some(errors.join("\n")) };
                let user_prompt = prompts::build_user_prompt(&ctx.body_text, correction.as_deref());
                let images = if ctx.prompt_kind.is_multimodal() { ctx.images.clone() } else { Vec::new() };
                let request = LlmRequest {
                    system_prompt: ctx.prompt_kind.system_prompt().to_string(),
                    user_prompt,
                    images,
                };

                match ctx.provider.complete(request).await {
                    Ok(raw_response) => TransformerState::Parse { attempt, errors, raw_response },
                    Err(e) => {
                        let mut errors = errors;
                        errors.push(e.to_string());
                        TransformerState::Retry { attempt, errors }
                    }
                }
            }

            TransformerState::Parse { attempt, mut errors, raw_response } => match json_recovery::recover(&raw_response) {
                Ok(parsed) => TransformerState::Validate { attempt, errors, parsed },
                Err(message) => {
                    errors.push(message);
                    TransformerState::Retry { attempt, errors }
                }
            },

            TransformerState::Validate { attempt, mut errors, parsed } => {
                match schema::validate(&parsed, ctx.prompt_kind, &ctx.source_url) {
                    Ok(ValidatedBatch { confidence, trades, row_errors }) => TransformerState::Done {
                        result: ExtractionResult {
                            confidence,
                            trades,
                            row_errors,
                            attempts_used: attempt,
                            source_format: ctx.prompt_kind.source_format(),
                        },
                    },
                    Err(message) => {
                        errors.push(message);
                        TransformerState::Retry { attempt, errors }
                    }
                }
            }

            TransformerState::Retry { attempt, errors } => {
                if attempt >= MAX_ATTEMPTS {
                    TransformerState::Failed {
                        error: TransformError::RetryExhausted {
                            attempts: attempt,
                            last_error: errors.last().cloned().unwrap_or_default(),
                        },
                    }
                } else {
                    TransformerState::Extract { attempt: attempt + 1, errors }
                }
            }

            terminal @ (TransformerState::Done { .. } | TransformerState::Failed { .. }) => terminal,
        }
    }
}
