pub mod batch;
pub mod config;
pub mod enrich;
pub mod error;
pub mod io;
pub mod isbndb;
pub mod merge;
pub mod paths;
pub mod query;
pub mod record;

pub use error::{ReadlogError, Result};
