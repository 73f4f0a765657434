pub mod base;
pub mod configs;
pub mod deepseek;
pub mod factory;
pub mod lmstudio;
pub mod moonshot;
pub mod openai;
pub mod perplexity;
pub mod utils;

#[cfg(test)]
pub mod mock;
