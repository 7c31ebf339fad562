//! Form state for the catalog pages.

pub mod product;

pub use product::{ClearPolicy, ProductForm};
