//! Render submission and batching engine.
//!
//! Drawables register with a [`submission::RenderSubmissionContext`], which every
//! frame collects them into shadow, main and UI record streams, clusters compatible
//! records into instanced draws, fills the per-path instance buffers and records the
//! draws through a [`backend::GraphicsBackend`].

pub mod backend;
pub mod math;
pub mod submission;
