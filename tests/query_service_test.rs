mod common;

use chrono::{Duration, Local, Utc};

use adega::store::{ProductSummary, QueryService, ReceiveStock, StockEngine};

use common::{insert_sale_at, seed_product, test_pool};

#[tokio::test]
async fn summary_of_unknown_product_is_all_zeros() {
    let pool = test_pool().await;
    let query = QueryService::new(pool.clone());

    let summary = query.product_summary(999).await.unwrap();
    assert_eq!(summary, ProductSummary::default());
}

#[tokio::test]
async fn summary_aggregates_both_ledger_sides() {
    let pool = test_pool().await;
    let query = QueryService::new(pool.clone());
    let engine = StockEngine::new(pool.clone());
    let id = seed_product(&pool, "Tannat", 1000).await;

    engine
        .receive_stock(ReceiveStock {
            product_id: id,
            quantity: 12,
            unit_cost_cents: Some(600),
            note: None,
        })
        .await
        .unwrap();
    engine.record_sale(id, 3).await.unwrap();
    engine.record_sale(id, 2).await.unwrap();

    let summary = query.product_summary(id).await.unwrap();
    assert_eq!(summary.quantity_received, 12);
    assert_eq!(summary.quantity_sold, 5);
    assert_eq!(summary.value_sold_cents, 5000);
}

#[tokio::test]
async fn report_without_bounds_lists_everything_newest_first() {
    let pool = test_pool().await;
    let query = QueryService::new(pool.clone());
    let id = seed_product(&pool, "Carmenère", 750).await;

    insert_sale_at(&pool, id, 2, 750, Utc::now() - Duration::days(5)).await;
    insert_sale_at(&pool, id, 1, 750, Utc::now()).await;

    let (sales, totals) = query.sales_report(None, None).await.unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0].quantity, 1);
    assert_eq!(sales[1].quantity, 2);
    assert_eq!(sales[0].product_name, "Carmenère");
    assert_eq!(totals.items, 3);
    assert_eq!(totals.value_cents, 3 * 750);
}

#[tokio::test]
async fn report_bounds_are_inclusive_calendar_dates() {
    let pool = test_pool().await;
    let query = QueryService::new(pool.clone());
    let id = seed_product(&pool, "Douro", 1100).await;

    insert_sale_at(&pool, id, 4, 1100, Utc::now() - Duration::days(5)).await;
    insert_sale_at(&pool, id, 1, 1100, Utc::now()).await;

    let today = Local::now().date_naive();

    // Lower bound only: cuts off the old sale, keeps today's.
    let (sales, totals) = query
        .sales_report(Some(today - Duration::days(2)), None)
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].quantity, 1);
    assert_eq!(totals.items, 1);

    // Upper bound only: the mirror image.
    let (sales, totals) = query
        .sales_report(None, Some(today - Duration::days(3)))
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].quantity, 4);
    assert_eq!(totals.items, 4);

    // A bound equal to the sale's own date still includes it.
    let (sales, _) = query
        .sales_report(Some(today), Some(today))
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].quantity, 1);

    // Empty window comes back as empty list and zero totals.
    let (sales, totals) = query
        .sales_report(
            Some(today + Duration::days(1)),
            Some(today + Duration::days(2)),
        )
        .await
        .unwrap();
    assert!(sales.is_empty());
    assert_eq!(totals.items, 0);
    assert_eq!(totals.value_cents, 0);
}

#[tokio::test]
async fn dashboard_counts_stock_and_defaults_to_today() {
    let pool = test_pool().await;
    let query = QueryService::new(pool.clone());
    let engine = StockEngine::new(pool.clone());

    let a = seed_product(&pool, "Espumante", 2000).await;
    let b = seed_product(&pool, "Branco", 500).await;
    engine
        .receive_stock(ReceiveStock {
            product_id: a,
            quantity: 3,
            unit_cost_cents: None,
            note: None,
        })
        .await
        .unwrap();
    engine
        .receive_stock(ReceiveStock {
            product_id: b,
            quantity: 10,
            unit_cost_cents: None,
            note: None,
        })
        .await
        .unwrap();

    insert_sale_at(&pool, a, 2, 2000, Utc::now() - Duration::days(4)).await;
    engine.record_sale(b, 1).await.unwrap();

    let dashboard = query.dashboard(None, None).await.unwrap();
    assert_eq!(dashboard.product_count, 2);
    assert_eq!(dashboard.total_stock_units, 3 + 9);
    assert_eq!(dashboard.total_stock_value_cents, 3 * 2000 + 9 * 500);

    // Without a range the sales card covers only the current day.
    assert_eq!(dashboard.sales_in_range.items, 1);
    assert_eq!(dashboard.sales_in_range.value_cents, 500);

    let today = Local::now().date_naive();
    let ranged = query
        .dashboard(Some(today - Duration::days(7)), Some(today))
        .await
        .unwrap();
    assert_eq!(ranged.sales_in_range.items, 3);
    assert_eq!(ranged.sales_in_range.value_cents, 2 * 2000 + 500);
}

#[tokio::test]
async fn low_stock_alert_orders_by_scarcity_then_name() {
    let pool = test_pool().await;
    let query = QueryService::new(pool.clone());
    let engine = StockEngine::new(pool.clone());

    let scarce = seed_product(&pool, "Amarone", 30000).await;
    let low = seed_product(&pool, "beaujolais", 4000).await;
    let also_low = seed_product(&pool, "Bardolino", 3500).await;
    let plenty = seed_product(&pool, "Lambrusco", 2500).await;

    for (id, quantity) in [(scarce, 1), (low, 5), (also_low, 5), (plenty, 20)] {
        engine
            .receive_stock(ReceiveStock {
                product_id: id,
                quantity,
                unit_cost_cents: None,
                note: None,
            })
            .await
            .unwrap();
    }

    let dashboard = query.dashboard(None, None).await.unwrap();
    let names: Vec<_> = dashboard
        .low_stock
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    // Threshold is 5: Lambrusco at 20 stays out. Ties sort by name,
    // case-insensitively.
    assert_eq!(names, vec!["Amarone", "Bardolino", "beaujolais"]);
    assert_eq!(dashboard.low_stock[0].stock_on_hand, 1);
}
