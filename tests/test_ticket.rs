//! Ticket emission, reading and cancellation integration tests.

use app_lib::app::{
    product_create, product_delete, product_get, ticket_cancel, ticket_create, ticket_get,
    ticket_list, ProductCreateReq, TicketCreateReq, TicketItemReq, TicketListReq,
    STATUS_CANCELLED, STATUS_ISSUED,
};
use app_lib::infra::db::init_test_db;
use app_lib::infra::DbPool;

// ──────────────────────── Helpers ────────────────────────

fn seed_product(pool: &DbPool, name: &str, price: f64, stock: i64) -> String {
    product_create(
        pool,
        ProductCreateReq {
            name: name.to_string(),
            description: None,
            price,
            stock: Some(stock),
            embedding: None,
        },
    )
    .unwrap()
    .id
}

fn item(product_id: &str, quantity: i64) -> TicketItemReq {
    TicketItemReq {
        product_id: product_id.to_string(),
        quantity,
    }
}

// ──────────────────────── ticket_create ────────────────────────

#[test]
fn create_ticket_computes_total_and_decrements_stock() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 5);
    let te = seed_product(&pool, "Te", 2.25, 8);

    let ticket = ticket_create(
        &pool,
        TicketCreateReq {
            customer: Some("Ana".to_string()),
            items: vec![item(&cafe, 2), item(&te, 4)],
        },
    )
    .unwrap();

    assert_eq!(ticket.customer, "Ana");
    assert_eq!(ticket.status, STATUS_ISSUED);
    assert_eq!(ticket.items.len(), 2);
    assert!((ticket.total - 30.0).abs() < 1e-9);

    assert_eq!(product_get(&pool, &cafe).unwrap().stock, 3);
    assert_eq!(product_get(&pool, &te).unwrap().stock, 4);
}

#[test]
fn create_ticket_requires_items() {
    let pool = init_test_db();
    let err = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![],
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn create_ticket_rejects_non_positive_quantity() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 5);
    let err = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![item(&cafe, 0)],
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn create_ticket_with_unknown_product_is_not_found() {
    let pool = init_test_db();
    let err = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![item("nope", 1)],
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn insufficient_stock_rolls_back_everything() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 5);
    let te = seed_product(&pool, "Te", 2.25, 1);

    let err = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![item(&cafe, 2), item(&te, 3)],
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_STOCK");

    // The first item's decrement must have been rolled back too.
    assert_eq!(product_get(&pool, &cafe).unwrap().stock, 5);
    assert_eq!(product_get(&pool, &te).unwrap().stock, 1);
    assert_eq!(ticket_list(&pool, TicketListReq::default()).unwrap().total, 0);
}

// ──────────────────────── ticket_get ────────────────────────

#[test]
fn get_ticket_returns_line_items() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 5);
    let created = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![item(&cafe, 3)],
        },
    )
    .unwrap();

    let ticket = ticket_get(&pool, &created.id).unwrap();
    assert_eq!(ticket.items.len(), 1);
    let line = &ticket.items[0];
    assert_eq!(line.product_id.as_deref(), Some(cafe.as_str()));
    assert_eq!(line.name, "Cafe");
    assert_eq!(line.quantity, 3);
    assert!((line.unit_price - 10.5).abs() < 1e-9);
    assert!((line.line_total - 31.5).abs() < 1e-9);
}

#[test]
fn get_missing_ticket_is_not_found() {
    let pool = init_test_db();
    assert_eq!(ticket_get(&pool, "nope").unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn deleting_a_product_keeps_ticket_snapshot() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 5);
    let created = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![item(&cafe, 1)],
        },
    )
    .unwrap();

    product_delete(&pool, &cafe).unwrap();

    let ticket = ticket_get(&pool, &created.id).unwrap();
    assert_eq!(ticket.items[0].product_id, None);
    assert_eq!(ticket.items[0].name, "Cafe");
    assert!((ticket.items[0].unit_price - 10.5).abs() < 1e-9);
}

// ──────────────────────── ticket_list ────────────────────────

#[test]
fn list_tickets_pages_and_counts_items() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 50);
    for _ in 0..3 {
        ticket_create(
            &pool,
            TicketCreateReq {
                customer: None,
                items: vec![item(&cafe, 2)],
            },
        )
        .unwrap();
    }

    let all = ticket_list(&pool, TicketListReq::default()).unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.items.len(), 3);
    assert!(all.items.iter().all(|t| t.item_count == 1));

    let page = ticket_list(
        &pool,
        TicketListReq {
            limit: Some(2),
            offset: Some(2),
        },
    )
    .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
}

// ──────────────────────── ticket_cancel ────────────────────────

#[test]
fn cancel_restores_stock_and_sets_status() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 5);
    let created = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![item(&cafe, 4)],
        },
    )
    .unwrap();
    assert_eq!(product_get(&pool, &cafe).unwrap().stock, 1);

    let cancelled = ticket_cancel(&pool, &created.id).unwrap();
    assert_eq!(cancelled.status, STATUS_CANCELLED);
    assert_eq!(product_get(&pool, &cafe).unwrap().stock, 5);
}

#[test]
fn cancel_twice_is_a_conflict() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 5);
    let created = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![item(&cafe, 1)],
        },
    )
    .unwrap();

    ticket_cancel(&pool, &created.id).unwrap();
    let err = ticket_cancel(&pool, &created.id).unwrap_err();
    assert_eq!(err.code(), "CONFLICT");
    // Stock restored exactly once.
    assert_eq!(product_get(&pool, &cafe).unwrap().stock, 5);
}

#[test]
fn cancel_missing_ticket_is_not_found() {
    let pool = init_test_db();
    assert_eq!(ticket_cancel(&pool, "nope").unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn cancel_after_product_deletion_skips_restock() {
    let pool = init_test_db();
    let cafe = seed_product(&pool, "Cafe", 10.5, 5);
    let created = ticket_create(
        &pool,
        TicketCreateReq {
            customer: None,
            items: vec![item(&cafe, 2)],
        },
    )
    .unwrap();

    product_delete(&pool, &cafe).unwrap();
    let cancelled = ticket_cancel(&pool, &created.id).unwrap();
    assert_eq!(cancelled.status, STATUS_CANCELLED);
}
