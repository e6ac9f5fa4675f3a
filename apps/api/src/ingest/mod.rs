pub mod dedup;
pub mod enrich;
pub mod handlers;
pub mod html;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod queue;
pub mod validation;
