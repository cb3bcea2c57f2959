//! Text handling shared by every brain.
//!
//! - Tokenization that keeps separators as tokens (`tokenizer`)
//! - Subject selection and seed windowing (`subject`)

/// Lowercasing word-boundary tokenizer and token classes.
pub mod tokenizer;

/// Subject extraction from a tokenized prompt.
pub mod subject;

pub use subject::{extract_subject, trim_message};
pub use tokenizer::process_string;
