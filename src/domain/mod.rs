//! Catalog domain types.

pub mod product;

pub use product::{
    coerce_price, is_truthy, parse_product_id, Product, ProductDraft, ProductInput, ProductPatch,
};
