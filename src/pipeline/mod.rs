//! The concurrent pipeline coupling the audio, analysis and retuning paths.

mod buffer_manager;
mod calculation_engine;
mod controller;
mod trigger_manager;

pub use controller::ResynthEngine;
