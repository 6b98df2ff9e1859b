// Interview question generation.
// Remote batches come from the LLM through llm_client; the built-in bank covers outages.

pub mod bank;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod service;
