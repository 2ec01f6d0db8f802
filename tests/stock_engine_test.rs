mod common;

use adega::errors::ServiceError;
use adega::models::ProductInput;
use adega::store::{CatalogStore, ReceiveStock, StockEngine};

use common::{product_input, sale_count, seed_product, stock_of, test_pool};

fn receive(product_id: i64, quantity: i64) -> ReceiveStock {
    ReceiveStock {
        product_id,
        quantity,
        unit_cost_cents: None,
        note: None,
    }
}

#[tokio::test]
async fn receive_then_sell_then_refuse_oversell() {
    let pool = test_pool().await;
    let engine = StockEngine::new(pool.clone());
    let id = seed_product(&pool, "Malbec Reserva", 500).await;

    let receipt = engine
        .receive_stock(ReceiveStock {
            product_id: id,
            quantity: 10,
            unit_cost_cents: Some(300),
            note: Some("primeira remessa".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(receipt.quantity, 10);
    assert_eq!(stock_of(&pool, id).await, 10);

    let sale = engine.record_sale(id, 4).await.unwrap();
    assert_eq!(sale.quantity, 4);
    assert_eq!(sale.unit_price_cents, 500);
    assert_eq!(sale.total_cents, 2000);
    assert_eq!(stock_of(&pool, id).await, 6);

    let err = engine.record_sale(id, 10).await.unwrap_err();
    match err {
        ServiceError::InsufficientStock(name) => assert_eq!(name, "Malbec Reserva"),
        other => panic!("expected InsufficientStock, got {:?}", other),
    }

    // The refused sale left nothing behind.
    assert_eq!(stock_of(&pool, id).await, 6);
    assert_eq!(sale_count(&pool, id).await, 1);
}

#[tokio::test]
async fn sale_keeps_price_snapshot_after_catalog_update() {
    let pool = test_pool().await;
    let engine = StockEngine::new(pool.clone());
    let catalog = CatalogStore::new(pool.clone());
    let id = seed_product(&pool, "Chianti", 800).await;
    engine.receive_stock(receive(id, 5)).await.unwrap();

    let first = engine.record_sale(id, 1).await.unwrap();
    assert_eq!(first.unit_price_cents, 800);

    catalog
        .update(
            id,
            ProductInput {
                unit_price_cents: 1200,
                ..product_input("Chianti", 0)
            },
        )
        .await
        .unwrap();

    let second = engine.record_sale(id, 1).await.unwrap();
    assert_eq!(second.unit_price_cents, 1200);

    // The earlier sale is untouched by the price change.
    let stored: (i64, i64) =
        sqlx::query_as("SELECT unit_price_cents, total_cents FROM sales WHERE id = ?1")
            .bind(first.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(stored, (800, 800));
}

#[tokio::test]
async fn receive_rejects_bad_input() {
    let pool = test_pool().await;
    let engine = StockEngine::new(pool.clone());
    let id = seed_product(&pool, "Rioja", 900).await;

    let err = engine.receive_stock(receive(id, 0)).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = engine.receive_stock(receive(id, -3)).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let err = engine
        .receive_stock(ReceiveStock {
            product_id: id,
            quantity: 2,
            unit_cost_cents: Some(-1),
            note: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    assert_eq!(stock_of(&pool, id).await, 0);
}

#[tokio::test]
async fn operations_on_unknown_product_are_not_found() {
    let pool = test_pool().await;
    let engine = StockEngine::new(pool.clone());

    let err = engine.receive_stock(receive(999, 5)).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = engine.record_sale(999, 1).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn sale_rejects_non_positive_quantity() {
    let pool = test_pool().await;
    let engine = StockEngine::new(pool.clone());
    let id = seed_product(&pool, "Vinho Verde", 400).await;
    engine.receive_stock(receive(id, 3)).await.unwrap();

    assert!(matches!(
        engine.record_sale(id, 0).await.unwrap_err(),
        ServiceError::InvalidInput(_)
    ));
    assert!(matches!(
        engine.record_sale(id, -2).await.unwrap_err(),
        ServiceError::InvalidInput(_)
    ));
    assert_eq!(stock_of(&pool, id).await, 3);
}

#[tokio::test]
async fn concurrent_sales_never_oversell() {
    let pool = test_pool().await;
    let engine = StockEngine::new(pool.clone());
    let id = seed_product(&pool, "Prosecco", 600).await;
    engine.receive_stock(receive(id, 5)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(
            async move { engine.record_sale(id, 1).await },
        ));
    }

    let mut ok = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(ServiceError::InsufficientStock(_)) => refused += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(ok, 5);
    assert_eq!(refused, 3);
    assert_eq!(stock_of(&pool, id).await, 0);
    assert_eq!(sale_count(&pool, id).await, 5);
}
