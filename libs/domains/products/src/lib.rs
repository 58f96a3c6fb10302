//! Products Domain
//!
//! Catalog products and their image collections, stored in PostgreSQL.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Service    │  ← validation, lookup, view mapping
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │  Repository  │  ← trait + PostgreSQL / in-memory implementations
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ Transaction  │  ← one unit per write that touches images
//! │   + Images   │  ← replace-or-preserve of product_images rows
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │   Entities   │  ← products (1) ──< product_images (n), cascade on delete
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{CreateProduct, Gender, PgProductRepository, ProductService};
//!
//! # async fn example(db: sea_orm::DatabaseConnection) -> domain_products::ProductResult<()> {
//! let service = ProductService::new(PgProductRepository::new(db));
//!
//! let created = service
//!     .create(CreateProduct {
//!         images: Some(vec!["a.png".into(), "b.png".into()]),
//!         ..CreateProduct::new("Men's Shirt", Gender::Men)
//!     })
//!     .await?;
//! assert_eq!(created.slug, "mens_shirt");
//!
//! let found = service.find_one_plain("MENS_SHIRT").await?;
//! assert_eq!(found.images, vec!["a.png", "b.png"]);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod images;
pub mod lookup;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod slug;
pub mod transaction;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use images::ImageChange;
pub use lookup::LookupTerm;
pub use models::{
    CreateProduct, Gender, NewProduct, Pagination, Product, ProductImage, ProductView,
    UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
pub use slug::normalize_slug;
pub use transaction::{TransactionCoordinator, TxState};
