//! L6: signal generation and enhancement (spec §4.7). Pure functions over
//! `Trade`/`SqsRecord` inputs, mirroring `scoring_engine`'s no-I/O shape.
//! The CLI's `score` stage owns persisting `AlphaSignal`/`EnhancedSignal`
//! via `disclosure-store`'s writers.

pub mod enhancer;
pub mod generator;
pub mod ladder;

pub use enhancer::{enhance_batch, ContractAwardTier, EnhancementInput};
pub use generator::{generate, SignalConfig};
