//! HTTP front-end for a single pretrained text-to-speech model.
//!
//! One synthesizer is loaded at startup and shared by every request behind a
//! single lock, so synthesis runs one request at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pages;
pub mod params;
pub mod resolve;
pub mod routes;
pub mod service;
pub mod state;

pub use routes::create_router;
pub use service::{ReferenceVoice, TtsService};
pub use state::{AppState, Settings};
