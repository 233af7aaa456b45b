//! Parsers that turn public FaaS traces into [`crate::invocation::InvocationRecord`]s.

pub mod azure_trace_2019;
pub mod azure_trace_2021;
