// Post generation: prompt templates, the backend-facing client, and the
// generate/refine pipeline. All backend calls go through llm_client.

pub mod client;
pub mod generator;
pub mod prompts;
