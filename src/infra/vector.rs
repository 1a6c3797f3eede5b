//! Vector-similarity operator over JSON-encoded embedding columns.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Register `vec_distance(a, b)`: cosine distance between two embeddings
/// stored as JSON float arrays. Deterministic so SQLite may reuse results
/// within a statement.
pub fn install(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "vec_distance",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let a = parse_embedding(&ctx.get::<String>(0)?)?;
            let b = parse_embedding(&ctx.get::<String>(1)?)?;
            cosine_distance(&a, &b)
        },
    )
}

fn parse_embedding(raw: &str) -> rusqlite::Result<Vec<f64>> {
    serde_json::from_str(raw).map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))
}

fn cosine_distance(a: &[f64], b: &[f64]) -> rusqlite::Result<f64> {
    if a.len() != b.len() {
        return Err(rusqlite::Error::UserFunctionError(
            format!("embedding dimension mismatch: {} vs {}", a.len(), b.len()).into(),
        ));
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        // Zero vectors carry no direction; treat them as maximally distant.
        return Ok(1.0);
    }
    Ok(1.0 - dot / (norm_a * norm_b))
}
