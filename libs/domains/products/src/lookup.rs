use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use crate::entity::product;
use crate::models::Product;

/// How a caller-supplied term is matched against products
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTerm {
    /// Exact primary-key match
    Id(Uuid),
    /// `UPPER(title) = title OR slug = slug`
    TitleOrSlug { title: String, slug: String },
}

impl LookupTerm {
    /// A canonical hyphenated UUID selects the identifier path; anything else
    /// is searched as a title or slug.
    pub fn parse(term: &str) -> Self {
        match Uuid::try_parse(term) {
            Ok(id) if term.len() == uuid::fmt::Hyphenated::LENGTH => LookupTerm::Id(id),
            _ => LookupTerm::TitleOrSlug {
                title: term.to_uppercase(),
                slug: term.to_lowercase(),
            },
        }
    }

    /// Query filter for the products table
    pub fn condition(&self) -> Condition {
        match self {
            LookupTerm::Id(id) => Condition::all().add(product::Column::Id.eq(*id)),
            LookupTerm::TitleOrSlug { title, slug } => Condition::any()
                .add(Expr::cust_with_values(
                    r#"UPPER("products"."title") = $1"#,
                    [title.clone()],
                ))
                .add(product::Column::Slug.eq(slug.clone())),
        }
    }

    /// In-process equivalent of [`LookupTerm::condition`]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            LookupTerm::Id(id) => product.id == *id,
            LookupTerm::TitleOrSlug { title, slug } => {
                product.title.to_uppercase() == *title || product.slug == *slug
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn product(title: &str, slug: &str) -> Product {
        Product {
            id: Uuid::now_v7(),
            title: title.to_string(),
            price: 0.0,
            description: None,
            slug: slug.to_string(),
            stock: 0,
            sizes: vec![],
            gender: Gender::Unisex,
            tags: vec![],
            images: vec![],
        }
    }

    #[test]
    fn test_hyphenated_uuid_is_identifier() {
        let id = Uuid::now_v7();
        assert_eq!(LookupTerm::parse(&id.to_string()), LookupTerm::Id(id));
    }

    #[test]
    fn test_non_canonical_uuid_forms_are_searched() {
        let id = Uuid::now_v7();
        let simple = id.simple().to_string();
        assert!(matches!(
            LookupTerm::parse(&simple),
            LookupTerm::TitleOrSlug { .. }
        ));
    }

    #[test]
    fn test_title_or_slug_casing() {
        assert_eq!(
            LookupTerm::parse("Men's Shirt"),
            LookupTerm::TitleOrSlug {
                title: "MEN'S SHIRT".to_string(),
                slug: "men's shirt".to_string(),
            }
        );
    }

    #[test]
    fn test_matches_title_case_insensitively() {
        let shirt = product("Men's Shirt", "mens_shirt");
        assert!(LookupTerm::parse("men's SHIRT").matches(&shirt));
        assert!(LookupTerm::parse("MENS_SHIRT").matches(&shirt));
        assert!(!LookupTerm::parse("mens shirt").matches(&shirt));
        assert!(LookupTerm::Id(shirt.id).matches(&shirt));
    }

    #[test]
    fn test_condition_sql() {
        let sql = product::Entity::find()
            .filter(LookupTerm::parse("Kids Cap").condition())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"UPPER("products"."title") = 'KIDS CAP'"#), "{sql}");
        assert!(sql.contains(r#""products"."slug" = 'kids cap'"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }
}
