// Job description generation: prompt templating, the request pipeline, and its HTTP handlers.
// All provider calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod prompts;
