//! The icall table: validated storage plus token resolution

mod resolver;
mod store;

pub use resolver::Resolver;
pub use store::{Entry, EntryStore, RawEntry};

pub(crate) use store::first_unsorted;
