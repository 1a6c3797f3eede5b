//! Ticket use cases: emit, read, cancel.
//!
//! A ticket snapshots product name and unit price at emission time, so later
//! product edits or deletions never rewrite history.

use crate::error::AppError;
use crate::infra::get_connection;
use crate::infra::DbPool;
use chrono::Utc;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_ISSUED: &str = "EMITIDO";
pub const STATUS_CANCELLED: &str = "ANULADO";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketItemReq {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCreateReq {
    pub customer: Option<String>,
    pub items: Vec<TicketItemReq>,
}

#[derive(Debug, Serialize)]
pub struct TicketItemDto {
    pub id: String,
    pub product_id: Option<String>,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Serialize)]
pub struct TicketDetailDto {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub total: f64,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<TicketItemDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListReq {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TicketListItemDto {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub total: f64,
    pub item_count: i64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct TicketListPage {
    pub items: Vec<TicketListItemDto>,
    pub total: i64,
}

/// Emit a ticket. One transaction covers the ticket row, its line items and
/// the stock decrements; any failure (unknown product, insufficient stock)
/// rolls the whole emission back.
pub fn ticket_create(pool: &DbPool, req: TicketCreateReq) -> Result<TicketDetailDto, AppError> {
    if req.items.is_empty() {
        return Err(AppError::Validation("at least one item is required".into()));
    }
    for item in &req.items {
        if item.quantity <= 0 {
            return Err(AppError::Validation("quantity must be positive".into()));
        }
    }

    let ticket_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let customer = req.customer.unwrap_or_default();

    let mut conn = get_connection(pool);
    let tx = conn.transaction().map_err(|e| AppError::Db(e.to_string()))?;

    tx.execute(
        "INSERT INTO tickets (id, cliente, estado, total, created_at, updated_at)
         VALUES (?1, ?2, ?3, 0, ?4, ?4)",
        params![ticket_id, customer, STATUS_ISSUED, &now],
    )
    .map_err(|e| AppError::Db(e.to_string()))?;

    let mut total = 0.0;
    for item in &req.items {
        let (name, price, stock): (String, f64, i64) = tx
            .query_row(
                "SELECT nombre, precio, stock FROM productos WHERE id = ?1",
                [&item.product_id],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .map_err(|_| AppError::NotFound(format!("product {}", item.product_id)))?;

        if stock < item.quantity {
            return Err(AppError::InsufficientStock(format!(
                "{name}: {} requested, {stock} available",
                item.quantity
            )));
        }

        tx.execute(
            "UPDATE productos SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3",
            params![item.quantity, &now, &item.product_id],
        )
        .map_err(|e| AppError::Db(e.to_string()))?;

        tx.execute(
            "INSERT INTO ticket_items (id, ticket_id, producto_id, nombre, cantidad, precio_unitario)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                ticket_id,
                &item.product_id,
                name,
                item.quantity,
                price
            ],
        )
        .map_err(|e| AppError::Db(e.to_string()))?;

        total += price * item.quantity as f64;
    }

    tx.execute(
        "UPDATE tickets SET total = ?1 WHERE id = ?2",
        params![total, ticket_id],
    )
    .map_err(|e| AppError::Db(e.to_string()))?;

    tx.commit().map_err(|e| AppError::Db(e.to_string()))?;
    drop(conn);
    ticket_get(pool, &ticket_id)
}

pub fn ticket_get(pool: &DbPool, id: &str) -> Result<TicketDetailDto, AppError> {
    let conn = get_connection(pool);
    let mut ticket = conn
        .query_row(
            "SELECT id, cliente, estado, total, created_at, updated_at FROM tickets WHERE id = ?1",
            [id],
            |row| {
                Ok(TicketDetailDto {
                    id: row.get(0)?,
                    customer: row.get(1)?,
                    status: row.get(2)?,
                    total: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                    items: Vec::new(),
                })
            },
        )
        .map_err(|_| AppError::NotFound(format!("ticket {id}")))?;

    let mut stmt = conn
        .prepare(
            "SELECT id, producto_id, nombre, cantidad, precio_unitario
             FROM ticket_items WHERE ticket_id = ?1 ORDER BY nombre",
        )
        .map_err(|e| AppError::Db(e.to_string()))?;
    let rows = stmt.query_map([id], |row| {
        let quantity: i64 = row.get(3)?;
        let unit_price: f64 = row.get(4)?;
        Ok(TicketItemDto {
            id: row.get(0)?,
            product_id: row.get(1)?,
            name: row.get(2)?,
            quantity,
            unit_price,
            line_total: unit_price * quantity as f64,
        })
    })?;
    for r in rows {
        ticket
            .items
            .push(r.map_err(|e| AppError::Db(e.to_string()))?);
    }
    Ok(ticket)
}

pub fn ticket_list(pool: &DbPool, req: TicketListReq) -> Result<TicketListPage, AppError> {
    let limit = req.limit.unwrap_or(50);
    let offset = req.offset.unwrap_or(0);

    let conn = get_connection(pool);
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM tickets", [], |r| r.get(0))
        .map_err(|e| AppError::Db(e.to_string()))?;

    let mut stmt = conn
        .prepare(
            "SELECT t.id, t.cliente, t.estado, t.total,
                    (SELECT COUNT(*) FROM ticket_items i WHERE i.ticket_id = t.id),
                    t.created_at
             FROM tickets t ORDER BY t.created_at DESC, t.id LIMIT ?1 OFFSET ?2",
        )
        .map_err(|e| AppError::Db(e.to_string()))?;
    let rows = stmt.query_map(params![limit, offset], |row| {
        Ok(TicketListItemDto {
            id: row.get(0)?,
            customer: row.get(1)?,
            status: row.get(2)?,
            total: row.get(3)?,
            item_count: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;
    let mut items = Vec::new();
    for r in rows {
        items.push(r.map_err(|e| AppError::Db(e.to_string()))?);
    }
    Ok(TicketListPage { items, total })
}

/// Cancel an issued ticket, returning its items to stock. Cancelling twice
/// is a conflict; items whose product was deleted are skipped when
/// restoring.
pub fn ticket_cancel(pool: &DbPool, id: &str) -> Result<TicketDetailDto, AppError> {
    let now = Utc::now().to_rfc3339();

    let mut conn = get_connection(pool);
    let tx = conn.transaction().map_err(|e| AppError::Db(e.to_string()))?;

    let status: String = tx
        .query_row("SELECT estado FROM tickets WHERE id = ?1", [id], |r| {
            r.get(0)
        })
        .map_err(|_| AppError::NotFound(format!("ticket {id}")))?;
    if status == STATUS_CANCELLED {
        return Err(AppError::Conflict("ticket is already cancelled".into()));
    }

    let items: Vec<(Option<String>, i64)> = {
        let mut stmt = tx
            .prepare("SELECT producto_id, cantidad FROM ticket_items WHERE ticket_id = ?1")
            .map_err(|e| AppError::Db(e.to_string()))?;
        let rows = stmt.query_map([id], |r| Ok((r.get(0)?, r.get(1)?)))?;
        rows.collect::<Result<_, _>>()
            .map_err(|e| AppError::Db(e.to_string()))?
    };

    for (product_id, quantity) in items {
        if let Some(product_id) = product_id {
            tx.execute(
                "UPDATE productos SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3",
                params![quantity, &now, product_id],
            )
            .map_err(|e| AppError::Db(e.to_string()))?;
        }
    }

    tx.execute(
        "UPDATE tickets SET estado = ?1, updated_at = ?2 WHERE id = ?3",
        params![STATUS_CANCELLED, &now, id],
    )
    .map_err(|e| AppError::Db(e.to_string()))?;

    tx.commit().map_err(|e| AppError::Db(e.to_string()))?;
    drop(conn);
    ticket_get(pool, id)
}
