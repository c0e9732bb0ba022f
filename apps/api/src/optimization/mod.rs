// Content optimization engine.
// Implements: brand profile, prompt templating, the three LLM stages, and the run pipeline.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod brand;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod stages;
pub mod template;
