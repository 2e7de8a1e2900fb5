pub mod error;

pub mod config;
pub mod feature;
pub mod host;
pub mod resolve;

pub mod assume;
pub mod credentials;
pub mod user_agent;

pub mod inject;
pub mod preprocessor;

pub mod cmd;

#[cfg(test)]
pub(crate) mod dev;
