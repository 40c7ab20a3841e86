// Resume analysis: remote model analysis with a local heuristic fallback,
// plus report export. All model calls go through llm_client.

pub mod engine;
pub mod handlers;
pub mod heuristic;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod remote;
pub mod report;
