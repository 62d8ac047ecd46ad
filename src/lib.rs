//! Typing trainer engine: chord recognition, lesson progression and finger
//! navigation hints over a physical keyboard model.

pub mod config;
pub mod generator;
pub mod keyboard;
pub mod navigation;
pub mod session;
pub mod trace_init;
