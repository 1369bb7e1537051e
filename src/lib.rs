pub mod bot;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod fuzzy_search;
pub mod index;
pub mod journal;
pub mod lookup;
pub mod resolver;
pub mod types;
pub mod vocabulary;

#[cfg(test)]
mod test_support;

pub use bot::run;
