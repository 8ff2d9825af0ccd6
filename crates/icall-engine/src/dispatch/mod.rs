//! Invocation of resolved entries

mod adapter;
mod frame;

pub use adapter::InvocationAdapter;
