mod catalog;
mod pipe;

pub use catalog::{Catalog, CatalogEntry};
pub use pipe::{EXIT_TYPE, PipeModel, PipeSpec, Position, RECEIVER_TYPE};
