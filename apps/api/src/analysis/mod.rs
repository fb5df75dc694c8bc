pub mod extract;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod queue;
pub mod summary;
pub mod token;
