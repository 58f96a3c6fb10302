use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::images::ImageChange;
use crate::lookup::LookupTerm;
use crate::models::{NewProduct, Pagination, Product, ProductImage};

/// Repository trait for Product persistence
///
/// Every write that touches image rows is atomic: either the product and its
/// whole image collection are stored, or nothing is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product together with its images
    async fn insert(&self, input: NewProduct) -> ProductResult<Product>;

    /// One page of products in id order, images loaded
    async fn list(&self, page: Pagination) -> ProductResult<Vec<Product>>;

    /// First product matching the term, images loaded
    async fn find(&self, term: &LookupTerm) -> ProductResult<Option<Product>>;

    /// Write every scalar of `product` and apply `change` to its images
    async fn save(&self, product: Product, change: ImageChange) -> ProductResult<Product>;

    /// Delete a product and its images
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Delete every product and image, returning the number of products removed
    async fn delete_all(&self) -> ProductResult<u64>;
}

#[derive(Debug, Clone, Default)]
struct Store {
    /// Scalar rows; `images` is always empty here
    products: BTreeMap<Uuid, Product>,
    images: BTreeMap<i32, ProductImage>,
    next_image_id: i32,
}

impl Store {
    fn check_unique(&self, id: Uuid, title: &str, slug: &str) -> ProductResult<()> {
        for other in self.products.values().filter(|p| p.id != id) {
            if other.title == title {
                return Err(ProductError::Conflict(format!(
                    "Key (title)=({title}) already exists."
                )));
            }
            if other.slug == slug {
                return Err(ProductError::Conflict(format!(
                    "Key (slug)=({slug}) already exists."
                )));
            }
        }
        Ok(())
    }

    fn images_of(&self, product_id: Uuid) -> Vec<ProductImage> {
        self.images
            .values()
            .filter(|image| image.product_id == product_id)
            .cloned()
            .collect()
    }

    fn insert_images(&mut self, product_id: Uuid, urls: &[String]) -> Vec<ProductImage> {
        urls.iter()
            .map(|url| {
                self.next_image_id += 1;
                let image = ProductImage {
                    id: self.next_image_id,
                    url: url.clone(),
                    product_id,
                };
                self.images.insert(image.id, image.clone());
                image
            })
            .collect()
    }

    fn delete_images(&mut self, product_id: Uuid) -> usize {
        let before = self.images.len();
        self.images.retain(|_, image| image.product_id != product_id);
        before - self.images.len()
    }

    fn with_images(&self, mut product: Product) -> Product {
        product.images = self.images_of(product.id);
        product
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Writers work on a copy of the store that replaces the shared one only when
/// the whole operation succeeded, mirroring a committed transaction.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn transact<T>(
        &self,
        body: impl FnOnce(&mut Store) -> ProductResult<T>,
    ) -> ProductResult<T> {
        let mut store = self.store.write().await;
        let mut draft = store.clone();
        let value = body(&mut draft)?;
        *store = draft;
        Ok(value)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, input: NewProduct) -> ProductResult<Product> {
        let product = self
            .transact(|store| {
                store.check_unique(input.id, &input.title, &input.slug)?;
                if store.products.contains_key(&input.id) {
                    return Err(ProductError::Conflict(format!(
                        "Key (id)=({}) already exists.",
                        input.id
                    )));
                }

                let product = Product {
                    id: input.id,
                    title: input.title,
                    price: input.price,
                    description: input.description,
                    slug: input.slug,
                    stock: input.stock,
                    sizes: input.sizes,
                    gender: input.gender,
                    tags: input.tags,
                    images: Vec::new(),
                };
                store.products.insert(product.id, product.clone());
                let images = store.insert_images(product.id, &input.images);

                Ok(Product { images, ..product })
            })
            .await?;

        tracing::info!(product_id = %product.id, images = product.images.len(), "Created product");
        Ok(product)
    }

    async fn list(&self, page: Pagination) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;

        Ok(store
            .products
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .map(|product| store.with_images(product.clone()))
            .collect())
    }

    async fn find(&self, term: &LookupTerm) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;

        Ok(store
            .products
            .values()
            .find(|product| term.matches(product))
            .map(|product| store.with_images(product.clone())))
    }

    async fn save(&self, product: Product, change: ImageChange) -> ProductResult<Product> {
        let id = product.id;
        let saved = self
            .transact(|store| {
                if !store.products.contains_key(&id) {
                    return Err(ProductError::NotFound(id.to_string()));
                }
                store.check_unique(id, &product.title, &product.slug)?;

                let images = match change {
                    ImageChange::Replace(urls) => {
                        let deleted = store.delete_images(id);
                        tracing::debug!(product_id = %id, deleted, inserted = urls.len(), "Replacing product images");
                        store.insert_images(id, &urls)
                    }
                    ImageChange::Preserve => store.images_of(id),
                };

                store.products.insert(
                    id,
                    Product {
                        images: Vec::new(),
                        ..product.clone()
                    },
                );
                Ok(Product { images, ..product })
            })
            .await?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut store = self.store.write().await;

        if store.products.remove(&id).is_some() {
            let images = store.delete_images(id);
            tracing::info!(product_id = %id, images, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_all(&self) -> ProductResult<u64> {
        let mut store = self.store.write().await;

        let removed = store.products.len() as u64;
        store.products.clear();
        store.images.clear();

        tracing::info!(removed, "Deleted all products");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProduct, Gender};

    fn new_product(title: &str, images: &[&str]) -> NewProduct {
        NewProduct::from(CreateProduct {
            images: Some(images.iter().map(|url| url.to_string()).collect()),
            ..CreateProduct::new(title, Gender::Unisex)
        })
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryProductRepository::new();

        let created = repo
            .insert(new_product("Men's Shirt", &["a.png", "b.png"]))
            .await
            .unwrap();
        assert_eq!(created.slug, "mens_shirt");
        assert_eq!(created.images.len(), 2);
        assert!(created.images[0].id < created.images[1].id);

        let found = repo
            .find(&LookupTerm::parse("mens_shirt"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_duplicate_title_leaves_no_rows() {
        let repo = InMemoryProductRepository::new();
        repo.insert(new_product("Cap", &["cap.png"])).await.unwrap();

        let mut duplicate = new_product("Cap", &["other.png"]);
        duplicate.slug = "another_cap".to_string();
        let result = repo.insert(duplicate).await;

        assert!(matches!(result, Err(ProductError::Conflict(ref msg)) if msg.contains("(title)=(Cap)")));
        let store = repo.store.read().await;
        assert_eq!(store.products.len(), 1);
        assert_eq!(store.images.len(), 1);
    }

    #[tokio::test]
    async fn test_save_conflict_keeps_previous_images() {
        let repo = InMemoryProductRepository::new();
        repo.insert(new_product("Hoodie", &[])).await.unwrap();
        let shirt = repo.insert(new_product("Shirt", &["s.png"])).await.unwrap();

        let renamed = Product {
            title: "Hoodie".to_string(),
            ..shirt.clone()
        };
        let result = repo
            .save(renamed, ImageChange::Replace(vec!["new.png".to_string()]))
            .await;
        assert!(matches!(result, Err(ProductError::Conflict(_))));

        let stored = repo.find(&LookupTerm::Id(shirt.id)).await.unwrap().unwrap();
        assert_eq!(stored, shirt);
    }

    #[tokio::test]
    async fn test_save_missing_product_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let ghost = repo.insert(new_product("Ghost", &[])).await.unwrap();
        repo.delete(ghost.id).await.unwrap();

        let result = repo.save(ghost, ImageChange::Preserve).await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_images() {
        let repo = InMemoryProductRepository::new();
        let product = repo.insert(new_product("Jacket", &["j1.png", "j2.png"])).await.unwrap();

        assert!(repo.delete(product.id).await.unwrap());
        assert!(!repo.delete(product.id).await.unwrap());
        assert!(repo.store.read().await.images.is_empty());
    }

    #[tokio::test]
    async fn test_list_pages_in_id_order() {
        let repo = InMemoryProductRepository::new();
        for title in ["A", "B", "C"] {
            repo.insert(new_product(title, &[])).await.unwrap();
        }

        let all = repo.list(Pagination::new(10, 0)).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));

        let page = repo.list(Pagination::new(1, 1)).await.unwrap();
        assert_eq!(page, vec![all[1].clone()]);

        assert_eq!(repo.delete_all().await.unwrap(), 3);
        assert!(repo.list(Pagination::default()).await.unwrap().is_empty());
    }
}
