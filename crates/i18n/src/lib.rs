mod catalog;
pub use catalog::{default_catalog, Catalog, CatalogError};

mod translation;
pub use translation::Translation;
