// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use pricesync::config::settings::DatabaseSettings;
use pricesync::domain::repositories::catalog_repository::{CatalogRepository, RepositoryError};
use pricesync::infrastructure::database::connection::create_pool;
use pricesync::infrastructure::database::entities::{brand, category, country, product};
use pricesync::infrastructure::database::schema::ensure_schema;
use pricesync::infrastructure::repositories::catalog_repo_impl::CatalogRepositoryImpl;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::json;
use std::sync::Arc;

async fn setup_db() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(5),
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
        ensure_schema: true,
    };
    let db = create_pool(&settings).await.unwrap();
    ensure_schema(&db).await.unwrap();
    // Running it twice must be harmless
    ensure_schema(&db).await.unwrap();

    country::ActiveModel {
        id: Set(1),
        name: Set("Germany".to_string()),
        code: Set("DE".to_string()),
        currency: Set("EUR".to_string()),
        currency_symbol: Set("€".to_string()),
        mobile_code: Set("+49".to_string()),
    }
    .insert(&db)
    .await
    .unwrap();
    brand::ActiveModel {
        id: Set(1),
        name: Set("Acme".to_string()),
    }
    .insert(&db)
    .await
    .unwrap();
    category::ActiveModel {
        id: Set(1),
        name: Set("Shoes".to_string()),
    }
    .insert(&db)
    .await
    .unwrap();

    Arc::new(db)
}

async fn insert_product(db: &DatabaseConnection, id: i64, url: &str, country_id: i64) {
    product::ActiveModel {
        id: Set(id),
        url: Set(url.to_string()),
        name: Set(format!("Product {}", id)),
        description: Set(format!("Description {}", id)),
        price: Set(10.0),
        sku: Set(None),
        images: Set(json!(["https://cdn.test/a.jpg"])),
        country_id: Set(country_id),
        brand_id: Set(Some(1)),
        category_id: Set(if id % 2 == 0 { Some(1) } else { None }),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_list_page_orders_and_filters() {
    let db = setup_db().await;
    for id in [5, 1, 3, 2, 4] {
        insert_product(&db, id, &format!("https://shop.test/{}", id), 1).await;
    }
    insert_product(&db, 6, "", 1).await;
    insert_product(&db, 7, "https://shop.test/7", 99).await;

    let repo = CatalogRepositoryImpl::new(db.clone());

    let first = repo.list_page(0, 3).await.unwrap();
    assert_eq!(first.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    let second = repo.list_page(3, 3).await.unwrap();
    assert_eq!(second.iter().map(|e| e.id).collect::<Vec<_>>(), vec![4, 5]);
    assert!(repo.list_page(5, 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_page_loads_relations() {
    let db = setup_db().await;
    insert_product(&db, 1, "https://shop.test/1", 1).await;
    insert_product(&db, 2, "https://shop.test/2", 1).await;

    let repo = CatalogRepositoryImpl::new(db.clone());
    let page = repo.list_page(0, 10).await.unwrap();

    let odd = &page[0];
    assert_eq!(odd.country.currency_symbol, "€");
    assert_eq!(odd.brand_name(), "Acme");
    assert_eq!(odd.category_name(), "");
    assert_eq!(odd.images, vec!["https://cdn.test/a.jpg".to_string()]);

    let even = &page[1];
    assert_eq!(even.category_name(), "Shoes");
}

#[tokio::test]
async fn test_update_price_and_delete() {
    let db = setup_db().await;
    insert_product(&db, 1, "https://shop.test/1", 1).await;
    let repo = CatalogRepositoryImpl::new(db.clone());

    repo.update_price(1, 42.5).await.unwrap();
    let stored = product::Entity::find_by_id(1)
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.price, 42.5);
    assert!(stored.updated_at.is_some());

    repo.delete(1).await.unwrap();
    assert!(product::Entity::find_by_id(1)
        .one(db.as_ref())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_missing_entry_reports_not_found() {
    let db = setup_db().await;
    let repo = CatalogRepositoryImpl::new(db);

    assert!(matches!(
        repo.update_price(404, 1.0).await,
        Err(RepositoryError::NotFound(404))
    ));
    assert!(matches!(
        repo.delete(404).await,
        Err(RepositoryError::NotFound(404))
    ));
}
