//! Image collection of a product.
//!
//! An update either replaces the whole collection or leaves it untouched;
//! rows are never merged or diffed. The functions here run on whatever
//! connection they are given, normally the transaction opened by
//! [`crate::transaction::TransactionCoordinator`].

use std::collections::HashMap;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;
use uuid::Uuid;

use crate::entity::product_image;
use crate::error::{ProductError, ProductResult};
use crate::models::ProductImage;

/// What an update does to the image rows, decided by the payload's shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    /// Drop every existing row, then insert these URLs in order
    Replace(Vec<String>),
    /// Keep the existing rows as they are
    Preserve,
}

impl From<Option<Vec<String>>> for ImageChange {
    fn from(images: Option<Vec<String>>) -> Self {
        match images {
            Some(urls) => ImageChange::Replace(urls),
            None => ImageChange::Preserve,
        }
    }
}

/// Reject blank image URLs before anything is written
pub fn check_urls(urls: &[String]) -> ProductResult<()> {
    match urls.iter().position(|url| url.trim().is_empty()) {
        Some(index) => Err(ProductError::Validation(format!(
            "images[{index}]: url must not be empty"
        ))),
        None => Ok(()),
    }
}

/// Insert one row per URL, in order, and return the stored rows
pub async fn insert_images<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    urls: &[String],
) -> Result<Vec<ProductImage>, DbErr> {
    let mut rows = Vec::with_capacity(urls.len());
    for url in urls {
        let model = product_image::ActiveModel {
            id: NotSet,
            url: Set(url.clone()),
            product_id: Set(product_id),
        }
        .insert(conn)
        .await?;
        rows.push(model.into());
    }
    Ok(rows)
}

/// Delete every image of `product_id`, then insert `urls` as the new collection
pub async fn replace_images<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    urls: &[String],
) -> Result<Vec<ProductImage>, DbErr> {
    let deleted = product_image::Entity::delete_many()
        .filter(product_image::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?
        .rows_affected;

    debug!(%product_id, deleted, inserted = urls.len(), "Replacing product images");
    insert_images(conn, product_id, urls).await
}

/// Existing rows of `product_id`, untouched, for reattaching to the product
pub async fn preserve_images<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<Vec<ProductImage>, DbErr> {
    debug!(%product_id, "Preserving product images");
    load_images(conn, product_id).await
}

/// Rows of one product in insertion order
pub async fn load_images<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<Vec<ProductImage>, DbErr> {
    let rows = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .order_by_asc(product_image::Column::Id)
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Rows of several products, grouped by owner, each group in insertion order
pub async fn load_images_for<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<ProductImage>>, DbErr> {
    let mut grouped: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = product_image::Entity::find()
        .filter(product_image::Column::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(product_image::Column::Id)
        .all(conn)
        .await?;

    for row in rows {
        grouped
            .entry(row.product_id)
            .or_default()
            .push(row.into());
    }
    Ok(grouped)
}
