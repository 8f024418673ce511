pub mod checklist;
pub mod clarify;
pub mod config;
pub mod document;
pub mod error;
pub mod goal;
pub mod intake;
pub mod io;
pub mod manifest;
pub mod paths;
pub mod progress;
pub mod resolution;
pub mod risk;
pub mod rubric;
pub mod scaffold;
pub mod state;
pub mod template;
pub mod types;
pub mod webhook;
pub mod workflow;

pub use error::{GoalkitError, Result};
