pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod output;
pub mod pricing;
pub mod recommend;
pub mod service;
pub mod vehicle;

pub use error::{Error, Result};
