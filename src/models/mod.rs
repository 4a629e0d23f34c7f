//! Logical model names and the catalog built from them.

pub mod catalog;
pub mod normalize;

pub use catalog::{is_small_model, Catalog, ModelCatalogBuilder};
pub use normalize::{normalize, normalize_logical};
