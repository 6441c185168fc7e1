//! Shared fixtures for end-to-end tests: mock collaborators, stub audio
//! tools and a programmatic config builder

#![allow(dead_code)]

pub mod config;
pub mod mock_llm;
pub mod mock_tts;
pub mod mock_wiki;
pub mod script;
#[cfg(unix)]
pub mod tools;
