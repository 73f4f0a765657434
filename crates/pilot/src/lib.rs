pub mod agent;
pub mod client;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod prompt_template;
pub mod providers;
pub mod tools;
