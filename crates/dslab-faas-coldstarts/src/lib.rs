//! A library for reconstructing cold starts of serverless functions from invocation traces.
//!
//! Given the invocations of every function, it classifies functions as periodic or non-periodic,
//! replays each function's invocations against a keep-alive pool of warm instances under two policies,
//! and merges the detected cold starts into one annotated table.
//!
//! See `tools/faas-coldstart-analysis` for a command line tool that runs the analysis over Azure Functions
//! 2019 and 2021 traces.

pub mod align;
pub mod analysis;
pub mod coldstart;
pub mod config;
pub mod encode;
pub mod error;
pub mod extra;
pub mod instance;
pub mod invocation;
pub mod parallel;
pub mod periodicity;
pub mod stats;
pub mod trace;
