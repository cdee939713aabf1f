//! Modular common utilities shared across Hireflow crates.
//!
//! Currently provides the `resilience` module: generic retry logic with
//! configurable backoff and jitter, used wherever the engine talks to
//! external backends that can fail transiently.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;
