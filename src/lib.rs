// src/lib.rs

pub mod agents;
pub mod config;
pub mod error;
pub mod flow;
pub mod llm;
pub mod memory;
pub mod pipeline;
pub mod session;
pub mod state;
pub mod text;
