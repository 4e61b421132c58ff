//! Authentication context types

pub mod context;

pub use context::RequestContext;
