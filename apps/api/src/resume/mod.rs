// Resume ingestion pipeline.
// PDF extraction → prompt → LLM → normalization → profile recognition.
// All LLM calls go through llm_client; nothing here talks to Gemini directly.
// CPU-bound PDF parsing must run inside tokio::task::spawn_blocking.

pub mod document;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod profiles;
pub mod prompts;
