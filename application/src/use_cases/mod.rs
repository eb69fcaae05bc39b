//! Use cases (application services)
//!
//! Serving side:
//! - [`stream_generation::StreamGenerationUseCase`]: fragment source to stream events
//! - [`active_generations::ActiveGenerations`]: one generation per conversation
//!
//! Client side:
//! - [`generation_controller::GenerationController`]: session state machine
//! - [`animator::Animator`]: fixed-tick reveal of queued units

pub mod active_generations;
pub mod animator;
pub mod generation_controller;
pub mod stream_generation;
