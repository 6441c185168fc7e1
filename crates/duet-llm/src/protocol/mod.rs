//! Wire format types for each provider API

pub mod anthropic;
pub mod openai;
