pub mod bot;
pub mod chatbot;
pub mod commands;
pub mod config;
pub mod error;
pub mod groq;
pub mod persona;
pub mod types;

pub use bot::run;
