//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::images::{self, ImageChange};
use crate::lookup::LookupTerm;
use crate::models::{CreateProduct, NewProduct, Pagination, Product, ProductView, UpdateProduct};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// Validates input, resolves lookup terms and maps stored products to the
/// flattened [`ProductView`] handed to callers.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a product and its images
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateProduct) -> ProductResult<ProductView> {
        input.validate()?;
        if let Some(urls) = &input.images {
            images::check_urls(urls)?;
        }

        let product = self.repository.insert(NewProduct::from(input)).await?;
        Ok(product.into())
    }

    /// One page of products in creation order
    #[instrument(skip(self))]
    pub async fn find_all(&self, page: Pagination) -> ProductResult<Vec<ProductView>> {
        page.validate()?;

        let products = self.repository.list(page).await?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    /// Product by id, title (any case) or slug, with its image rows
    #[instrument(skip(self))]
    pub async fn find_one(&self, term: &str) -> ProductResult<Product> {
        self.repository
            .find(&LookupTerm::parse(term))
            .await?
            .ok_or_else(|| ProductError::NotFound(term.to_string()))
    }

    /// Same as [`ProductService::find_one`], images flattened to URLs
    #[instrument(skip(self))]
    pub async fn find_one_plain(&self, term: &str) -> ProductResult<ProductView> {
        self.find_one(term).await.map(ProductView::from)
    }

    /// Merge the supplied fields into the stored product.
    ///
    /// Images are replaced when `input.images` is present (an empty list
    /// deletes them all) and kept otherwise.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<ProductView> {
        input.validate()?;
        if let Some(urls) = &input.images {
            images::check_urls(urls)?;
        }

        let mut product = self
            .repository
            .find(&LookupTerm::Id(id))
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))?;

        let change: ImageChange = product.apply_update(input);
        let saved = self.repository.save(product, change).await?;
        Ok(saved.into())
    }

    /// Delete the product matching `term` together with its images
    #[instrument(skip(self))]
    pub async fn remove(&self, term: &str) -> ProductResult<()> {
        let product = self.find_one(term).await?;

        if !self.repository.delete(product.id).await? {
            return Err(ProductError::NotFound(term.to_string()));
        }
        Ok(())
    }

    /// Delete every product; administrative use only
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> ProductResult<u64> {
        self.repository.delete_all().await
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, ProductImage};
    use crate::repository::MockProductRepository;
    use mockall::predicate::{always, eq};

    fn stored(title: &str, urls: &[&str]) -> Product {
        let id = Uuid::now_v7();
        Product {
            id,
            title: title.to_string(),
            price: 20.0,
            description: None,
            slug: crate::normalize_slug(title),
            stock: 3,
            sizes: vec!["S".to_string()],
            gender: Gender::Men,
            tags: vec![],
            images: urls
                .iter()
                .enumerate()
                .map(|(i, url)| ProductImage {
                    id: i as i32 + 1,
                    url: url.to_string(),
                    product_id: id,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_before_storage() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_insert().never();

        let service = ProductService::new(mock_repo);
        let result = service
            .create(CreateProduct {
                price: Some(-5.0),
                ..CreateProduct::new("Shirt", Gender::Men)
            })
            .await;

        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_image_url() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_insert().never();

        let service = ProductService::new(mock_repo);
        let result = service
            .create(CreateProduct {
                images: Some(vec!["a.png".to_string(), String::new()]),
                ..CreateProduct::new("Shirt", Gender::Men)
            })
            .await;

        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_passes_normalized_slug() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo
            .expect_insert()
            .withf(|input| input.slug == "mens_shirt" && input.images == ["a.png", "b.png"])
            .returning(|_| Ok(stored("Men's Shirt", &["a.png", "b.png"])));

        let service = ProductService::new(mock_repo);
        let view = service
            .create(CreateProduct {
                images: Some(vec!["a.png".to_string(), "b.png".to_string()]),
                ..CreateProduct::new("Men's Shirt", Gender::Men)
            })
            .await
            .unwrap();

        assert_eq!(view.images, vec!["a.png", "b.png"]);
    }

    #[tokio::test]
    async fn test_find_one_miss_names_term() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_find().returning(|_| Ok(None));

        let service = ProductService::new(mock_repo);
        let err = service.find_one("ghost").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Product with id, title or slug \"ghost\" not found"
        );
    }

    #[tokio::test]
    async fn test_find_all_rejects_zero_limit() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_list().never();

        let service = ProductService::new(mock_repo);
        let result = service.find_all(Pagination::new(0, 0)).await;
        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_without_images_preserves() {
        let mut mock_repo = MockProductRepository::new();
        let existing = stored("Hoodie", &["h.png"]);
        let id = existing.id;

        mock_repo
            .expect_find()
            .with(eq(LookupTerm::Id(id)))
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo
            .expect_save()
            .withf(|product, change| product.stock == 9 && *change == ImageChange::Preserve)
            .returning(|product, _| Ok(product));

        let service = ProductService::new(mock_repo);
        let view = service
            .update(
                id,
                UpdateProduct {
                    stock: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(view.images, vec!["h.png"]);
    }

    #[tokio::test]
    async fn test_update_with_empty_images_replaces() {
        let mut mock_repo = MockProductRepository::new();
        let existing = stored("Hoodie", &["h.png"]);
        let id = existing.id;

        mock_repo
            .expect_find()
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo
            .expect_save()
            .with(always(), eq(ImageChange::Replace(vec![])))
            .returning(|product, _| {
                Ok(Product {
                    images: vec![],
                    ..product
                })
            });

        let service = ProductService::new(mock_repo);
        let view = service
            .update(
                id,
                UpdateProduct {
                    images: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(view.images.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_find().returning(|_| Ok(None));
        mock_repo.expect_save().never();

        let service = ProductService::new(mock_repo);
        let id = Uuid::now_v7();
        let err = service
            .update(id, UpdateProduct::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound(ref term) if *term == id.to_string()));
    }

    #[tokio::test]
    async fn test_remove_resolves_term_then_deletes() {
        let mut mock_repo = MockProductRepository::new();
        let existing = stored("Cap", &[]);
        let id = existing.id;

        mock_repo
            .expect_find()
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo
            .expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(true));

        let service = ProductService::new(mock_repo);
        service.remove("CAP").await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_missing_product() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_find().returning(|_| Ok(None));
        mock_repo.expect_delete().never();

        let service = ProductService::new(mock_repo);
        let err = service.remove("nothing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
