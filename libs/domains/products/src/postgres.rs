use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entity::product,
    error::{ProductError, ProductResult},
    images::{self, ImageChange},
    lookup::LookupTerm,
    models::{NewProduct, Pagination, Product},
    repository::ProductRepository,
    transaction::TransactionCoordinator,
};

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn insert(&self, input: NewProduct) -> ProductResult<Product> {
        let mut tx = TransactionCoordinator::new(&self.db);
        let created = tx
            .run(move |txn| {
                Box::pin(async move {
                    let model = product::ActiveModel::from(&input).insert(txn).await?;
                    let rows = images::insert_images(txn, model.id, &input.images).await?;
                    model.into_product(rows)
                })
            })
            .await?;

        tracing::info!(product_id = %created.id, images = created.images.len(), "Created product");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn list(&self, page: Pagination) -> ProductResult<Vec<Product>> {
        let mut tx = TransactionCoordinator::read_snapshot(&self.db);
        tx.run(move |txn| {
            Box::pin(async move {
                let models = product::Entity::find()
                    .order_by_asc(product::Column::Id)
                    .limit(page.limit)
                    .offset(page.offset)
                    .all(txn)
                    .await?;

                let ids: Vec<Uuid> = models.iter().map(|model| model.id).collect();
                let mut grouped = images::load_images_for(txn, &ids).await?;

                models
                    .into_iter()
                    .map(|model| {
                        let rows = grouped.remove(&model.id).unwrap_or_default();
                        model.into_product(rows)
                    })
                    .collect()
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find(&self, term: &LookupTerm) -> ProductResult<Option<Product>> {
        let condition = term.condition();
        let mut tx = TransactionCoordinator::read_snapshot(&self.db);
        tx.run(move |txn| {
            Box::pin(async move {
                let Some(model) = product::Entity::find().filter(condition).one(txn).await? else {
                    return Ok(None);
                };

                let rows = images::load_images(txn, model.id).await?;
                model.into_product(rows).map(Some)
            })
        })
        .await
    }

    #[instrument(skip(self, updated, change), fields(product_id = %updated.id))]
    async fn save(&self, updated: Product, change: ImageChange) -> ProductResult<Product> {
        let id = updated.id;
        let mut tx = TransactionCoordinator::new(&self.db);
        let saved = tx
            .run(move |txn| {
                Box::pin(async move {
                    // Row lock on the product serializes concurrent image replaces
                    let model = match product::ActiveModel::from(&updated).update(txn).await {
                        Ok(model) => model,
                        Err(DbErr::RecordNotUpdated) => {
                            return Err(ProductError::NotFound(id.to_string()));
                        }
                        Err(err) => return Err(err.into()),
                    };

                    let rows = match &change {
                        ImageChange::Replace(urls) => images::replace_images(txn, id, urls).await?,
                        ImageChange::Preserve => images::preserve_images(txn, id).await?,
                    };
                    model.into_product(rows)
                })
            })
            .await?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let rows_affected = product::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?
            .rows_affected;

        if rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> ProductResult<u64> {
        let removed = product::Entity::delete_many()
            .exec(&self.db)
            .await?
            .rows_affected;

        tracing::info!(removed, "Deleted all products");
        Ok(removed)
    }
}
