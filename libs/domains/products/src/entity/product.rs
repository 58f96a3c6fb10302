use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{Set, Unchanged};
use serde::{Deserialize, Serialize};

use crate::error::{ProductError, ProductResult};
use crate::models::{Gender, NewProduct, Product, ProductImage};

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text", unique)]
    pub title: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", unique)]
    pub slug: String,
    pub stock: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub sizes: Json,
    pub gender: Gender,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn string_list(column: &str, value: Json) -> ProductResult<Vec<String>> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(column, error = %e, "Stored product column is not a string array");
        ProductError::Internal(format!("Corrupt {column} column"))
    })
}

impl Model {
    /// Attach `images` and decode the JSON list columns
    pub fn into_product(self, images: Vec<ProductImage>) -> ProductResult<Product> {
        Ok(Product {
            sizes: string_list("sizes", self.sizes)?,
            tags: string_list("tags", self.tags)?,
            id: self.id,
            title: self.title,
            price: self.price,
            description: self.description,
            slug: self.slug,
            stock: self.stock,
            gender: self.gender,
            images,
        })
    }
}

impl From<&NewProduct> for ActiveModel {
    fn from(input: &NewProduct) -> Self {
        ActiveModel {
            id: Set(input.id),
            title: Set(input.title.clone()),
            price: Set(input.price),
            description: Set(input.description.clone()),
            slug: Set(input.slug.clone()),
            stock: Set(input.stock),
            sizes: Set(Json::from(input.sizes.clone())),
            gender: Set(input.gender),
            tags: Set(Json::from(input.tags.clone())),
        }
    }
}

/// Every scalar column is written; the key stays as it is.
impl From<&Product> for ActiveModel {
    fn from(product: &Product) -> Self {
        ActiveModel {
            id: Unchanged(product.id),
            title: Set(product.title.clone()),
            price: Set(product.price),
            description: Set(product.description.clone()),
            slug: Set(product.slug.clone()),
            stock: Set(product.stock),
            sizes: Set(Json::from(product.sizes.clone())),
            gender: Set(product.gender),
            tags: Set(Json::from(product.tags.clone())),
        }
    }
}
