//! Product use cases.

use crate::error::AppError;
use crate::infra::get_connection;
use crate::infra::DbPool;
use chrono::Utc;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, nombre, descripcion, precio, stock, embedding IS NOT NULL, created_at, updated_at";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreateReq {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: Option<i64>,
    pub embedding: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub has_embedding: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateReq {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub embedding: Option<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListReq {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductListPage {
    pub items: Vec<ProductDto>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchReq {
    pub embedding: Vec<f64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductMatchDto {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub distance: f64,
}

fn map_product_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProductDto> {
    Ok(ProductDto {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        stock: row.get(4)?,
        has_embedding: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn encode_embedding(embedding: &[f64]) -> Result<String, AppError> {
    serde_json::to_string(embedding).map_err(|e| AppError::Db(e.to_string()))
}

fn validate(name: &str, price: f64, stock: i64) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    if price < 0.0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }
    if stock < 0 {
        return Err(AppError::Validation("stock must not be negative".into()));
    }
    Ok(())
}

pub fn product_create(pool: &DbPool, req: ProductCreateReq) -> Result<ProductDto, AppError> {
    let name = req.name.trim();
    let stock = req.stock.unwrap_or(0);
    validate(name, req.price, stock)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let description = req.description.unwrap_or_default();
    let embedding = match &req.embedding {
        Some(v) => Some(encode_embedding(v)?),
        None => None,
    };

    let conn = get_connection(pool);
    conn.execute(
        "INSERT INTO productos (id, nombre, descripcion, precio, stock, embedding, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![id, name, description, req.price, stock, embedding, &now],
    )
    .map_err(|e| AppError::Db(e.to_string()))?;

    Ok(ProductDto {
        id,
        name: name.to_string(),
        description,
        price: req.price,
        stock,
        has_embedding: embedding.is_some(),
        created_at: now.clone(),
        updated_at: now,
    })
}

pub fn product_get(pool: &DbPool, id: &str) -> Result<ProductDto, AppError> {
    let conn = get_connection(pool);
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM productos WHERE id = ?1"),
        [id],
        map_product_row,
    )
    .map_err(|_| AppError::NotFound(format!("product {id}")))
}

pub fn product_list(pool: &DbPool, req: ProductListReq) -> Result<ProductListPage, AppError> {
    let pattern = format!("%{}%", req.search.as_deref().unwrap_or("").trim());
    let limit = req.limit.unwrap_or(50);
    let offset = req.offset.unwrap_or(0);

    let conn = get_connection(pool);
    let total: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM productos WHERE nombre LIKE ?1",
            [&pattern],
            |r| r.get(0),
        )
        .map_err(|e| AppError::Db(e.to_string()))?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM productos WHERE nombre LIKE ?1
             ORDER BY nombre COLLATE NOCASE LIMIT ?2 OFFSET ?3"
        ))
        .map_err(|e| AppError::Db(e.to_string()))?;
    let rows = stmt.query_map(params![&pattern, limit, offset], map_product_row)?;
    let mut items = Vec::new();
    for r in rows {
        items.push(r.map_err(|e| AppError::Db(e.to_string()))?);
    }
    Ok(ProductListPage { items, total })
}

pub fn product_update(pool: &DbPool, req: ProductUpdateReq) -> Result<ProductDto, AppError> {
    let now = Utc::now().to_rfc3339();
    let embedding = match &req.embedding {
        Some(v) => Some(encode_embedding(v)?),
        None => None,
    };

    let conn = get_connection(pool);
    let current = conn
        .query_row(
            "SELECT nombre, descripcion, precio, stock FROM productos WHERE id = ?1",
            [&req.id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, f64>(2)?,
                    r.get::<_, i64>(3)?,
                ))
            },
        )
        .map_err(|_| AppError::NotFound(format!("product {}", req.id)))?;

    let name = req
        .name
        .as_deref()
        .map(|s| s.trim().to_string())
        .unwrap_or(current.0);
    let description = req.description.unwrap_or(current.1);
    let price = req.price.unwrap_or(current.2);
    let stock = req.stock.unwrap_or(current.3);
    validate(&name, price, stock)?;

    match &embedding {
        Some(enc) => conn.execute(
            "UPDATE productos SET nombre = ?1, descripcion = ?2, precio = ?3, stock = ?4,
             embedding = ?5, updated_at = ?6 WHERE id = ?7",
            params![&name, &description, price, stock, enc, &now, &req.id],
        ),
        None => conn.execute(
            "UPDATE productos SET nombre = ?1, descripcion = ?2, precio = ?3, stock = ?4,
             updated_at = ?5 WHERE id = ?6",
            params![&name, &description, price, stock, &now, &req.id],
        ),
    }
    .map_err(|e| AppError::Db(e.to_string()))?;

    drop(conn);
    product_get(pool, &req.id)
}

pub fn product_delete(pool: &DbPool, id: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    let affected = conn
        .execute("DELETE FROM productos WHERE id = ?1", [id])
        .map_err(|e| AppError::Db(e.to_string()))?;
    if affected == 0 {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    Ok(())
}

/// Nearest products by cosine distance against a query embedding. Requires
/// the vector capability; products without an embedding are skipped.
pub fn product_search_similar(
    pool: &DbPool,
    req: ProductSearchReq,
) -> Result<Vec<ProductMatchDto>, AppError> {
    if !pool.options().vector {
        return Err(AppError::Validation(
            "vector capability is not enabled".into(),
        ));
    }
    if req.embedding.is_empty() {
        return Err(AppError::Validation("embedding is required".into()));
    }
    let query = encode_embedding(&req.embedding)?;
    let limit = req.limit.unwrap_or(10);

    let conn = get_connection(pool);
    let mut stmt = conn
        .prepare(
            "SELECT id, nombre, precio, stock, vec_distance(embedding, ?1) AS distance
             FROM productos WHERE embedding IS NOT NULL
             ORDER BY distance LIMIT ?2",
        )
        .map_err(|e| AppError::Db(e.to_string()))?;
    let rows = stmt.query_map(params![&query, limit], |row| {
        Ok(ProductMatchDto {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
            stock: row.get(3)?,
            distance: row.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| AppError::Db(e.to_string()))?);
    }
    Ok(out)
}
