//! End-to-end scenarios across services, including concurrent writers on a
//! file-backed database.

use std::path::PathBuf;

use storefront_core::{
    Caller, NewManufacturer, NewOffer, NewProduct, NewShipping, NewAddress, Offer, OrderStatus, Role,
};
use storefront_db::{Database, DbConfig, InventoryLedger, UserRepository};
use storefront_service::{ErrorCode, Storefront};

// =============================================================================
// Helpers
// =============================================================================

async fn in_memory_store() -> Storefront {
    Storefront::new(Database::new(DbConfig::in_memory()).await.unwrap())
}

/// A store on a fresh temp file, so several pooled connections write
/// concurrently. Returns the path for cleanup.
async fn file_store() -> (Storefront, PathBuf) {
    let config = DbConfig::temp_file();
    let path = config.database_path.clone();
    let store = Storefront::new(Database::new(config).await.unwrap());
    (store, path)
}

async fn remove_store(store: Storefront, path: PathBuf) {
    store.db().close().await;
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

async fn caller(store: &Storefront, role: Role) -> Caller {
    let mut conn = store.db().acquire().await.unwrap();
    let email = format!("{}@example.com", storefront_core::new_id());
    let user = UserRepository::insert(&mut conn, "Scenario User", &email, role)
        .await
        .unwrap();
    Caller::new(user.id, role)
}

async fn offer(store: &Storefront, admin: &Caller, stock: i64) -> Offer {
    let product = store
        .catalog()
        .create_product(
            admin,
            NewProduct {
                name: "Office Chair".to_string(),
                description: Some("Mesh".to_string()),
                rating: 4,
            },
        )
        .await
        .unwrap();
    let manufacturer = store
        .catalog()
        .create_manufacturer(
            admin,
            NewManufacturer {
                name: "Northwind".to_string(),
                rating: 4,
            },
        )
        .await
        .unwrap();
    store
        .catalog()
        .create_offer(
            admin,
            NewOffer {
                product_id: product.id,
                manufacturer_id: manufacturer.id,
                price_cents: 4999,
                stock: Some(stock),
            },
        )
        .await
        .unwrap()
}

async fn stock(store: &Storefront, offer_id: &str) -> i64 {
    let mut conn = store.db().acquire().await.unwrap();
    InventoryLedger::available_stock(&mut conn, offer_id)
        .await
        .unwrap()
        .unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_never_oversell() {
    let (store, path) = file_store().await;
    let admin = caller(&store, Role::Admin).await;
    let offer = offer(&store, &admin, 5).await;

    let mut buyers = Vec::new();
    for _ in 0..6 {
        buyers.push(caller(&store, Role::User).await);
    }

    let mut handles = Vec::new();
    for buyer in buyers {
        let store = store.clone();
        let offer_id = offer.id.clone();
        handles.push(tokio::spawn(async move {
            store.orders().create(&buyer, &offer_id, 1).await
        }));
    }

    let mut placed = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(err) => {
                assert_eq!(err.code, ErrorCode::Conflict, "unexpected error: {err}");
                conflicts += 1;
            }
        }
    }

    assert_eq!(placed, 5);
    assert_eq!(conflicts, 1);
    assert_eq!(stock(&store, &offer.id).await, 0);
    assert_eq!(store.orders().list(&admin).await.unwrap().len(), 5);

    remove_store(store, path).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_payments_record_once() {
    let (store, path) = file_store().await;
    let admin = caller(&store, Role::Admin).await;
    let buyer = caller(&store, Role::User).await;
    let offer = offer(&store, &admin, 1).await;
    let order = store.orders().create(&buyer, &offer.id, 1).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        let buyer = buyer.clone();
        let order_id = order.id.clone();
        handles.push(tokio::spawn(async move {
            store.payments().create(&buyer, &order_id, 4999, "card").await
        }));
    }

    let mut recorded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => recorded += 1,
            Err(err) => assert_eq!(err.code, ErrorCode::Conflict, "unexpected error: {err}"),
        }
    }
    assert_eq!(recorded, 1);

    remove_store(store, path).await;
}

#[tokio::test]
async fn test_sell_out_then_cancel_restores_stock() {
    let store = in_memory_store().await;
    let admin = caller(&store, Role::Admin).await;
    let buyer = caller(&store, Role::User).await;
    let offer = offer(&store, &admin, 5).await;

    let big = store.orders().create(&buyer, &offer.id, 5).await.unwrap();
    assert_eq!(stock(&store, &offer.id).await, 0);

    let err = store.orders().create(&buyer, &offer.id, 1).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(err.http_status(), 409);

    let cancelled = store
        .orders()
        .set_status(&buyer, &big.id, "Cancelled")
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock(&store, &offer.id).await, 5);

    // the restored stock is orderable again
    store.orders().create(&buyer, &offer.id, 1).await.unwrap();
    assert_eq!(stock(&store, &offer.id).await, 4);
}

#[tokio::test]
async fn test_cart_accumulates_without_reserving() {
    let store = in_memory_store().await;
    let admin = caller(&store, Role::Admin).await;
    let buyer = caller(&store, Role::User).await;
    let offer = offer(&store, &admin, 10).await;

    store.cart().add(&buyer, &offer.id, Some(3)).await.unwrap();
    store.cart().add(&buyer, &offer.id, Some(3)).await.unwrap();

    let lines = store.cart().list(&buyer).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 6);
    assert_eq!(lines[0].product_name, "Office Chair");
    assert_eq!(stock(&store, &offer.id).await, 10);

    // checking out is one order per line
    let order = store
        .orders()
        .create(&buyer, &lines[0].offer_id, lines[0].quantity)
        .await
        .unwrap();
    assert_eq!(order.quantity, 6);
    store.cart().clear(&buyer).await.unwrap();
    assert_eq!(stock(&store, &offer.id).await, 4);
}

#[tokio::test]
async fn test_fulfilment_flow() {
    let store = in_memory_store().await;
    let admin = caller(&store, Role::Admin).await;
    let buyer = caller(&store, Role::User).await;
    let offer = offer(&store, &admin, 2).await;

    let order = store.orders().create(&buyer, &offer.id, 1).await.unwrap();
    store.payments().create(&buyer, &order.id, 4999, "paypal").await.unwrap();
    let address = store
        .addresses()
        .create(
            &buyer,
            NewAddress {
                country: "Netherlands".to_string(),
                city: "Utrecht".to_string(),
                zip_code: "3511".to_string(),
                address_line: "Oudegracht 1".to_string(),
            },
        )
        .await
        .unwrap();
    store
        .shipping()
        .create(
            &admin,
            NewShipping {
                order_id: order.id.clone(),
                address_id: address.id.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    for status in ["Processing", "Shipped", "Delivered"] {
        store.orders().set_status(&admin, &order.id, status).await.unwrap();
    }
    let delivered = store.orders().get(&buyer, &order.id).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let err = store
        .orders()
        .set_status(&buyer, &order.id, "Cancelled")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = store.addresses().delete(&buyer, &address.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    let err = store.catalog().delete_offer(&admin, &offer.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    // an administrator's delete takes payment and shipping with it
    store.orders().delete(&admin, &order.id).await.unwrap();
    assert!(store.payments().list_all(&admin).await.unwrap().is_empty());
    assert!(store.shipping().list_all(&admin).await.unwrap().is_empty());
    store.addresses().delete(&buyer, &address.id).await.unwrap();
    assert_eq!(stock(&store, &offer.id).await, 1);
}
