//! JARVIS-X: a personal AI assistant for the terminal. Chat with a dozen
//! hosted models across four providers, with personality modes, persistent
//! conversation memory, a bounded response cache, and local file tooling.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod fileops;
pub mod fs_util;
pub mod memory;
pub mod personality;
pub mod providers;
pub mod repl;
pub mod secrets;
pub mod types;
pub mod voice;
pub mod web;
