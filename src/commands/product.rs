use crate::app::{
    product_create, product_delete, product_get, product_list, product_search_similar,
    product_update, ProductCreateReq, ProductDto, ProductListPage, ProductListReq,
    ProductMatchDto, ProductSearchReq, ProductUpdateReq,
};
use crate::error::AppError;
use crate::infra::DbPool;
use serde::Deserialize;
use tauri::State;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductGetReq {
    pub id: String,
}

#[tauri::command]
pub fn cmd_product_create(
    pool: State<DbPool>,
    req: ProductCreateReq,
) -> Result<ProductDto, AppError> {
    product_create(&pool, req)
}

#[tauri::command]
pub fn cmd_product_get(pool: State<DbPool>, req: ProductGetReq) -> Result<ProductDto, AppError> {
    product_get(&pool, &req.id)
}

#[tauri::command]
pub fn cmd_product_list(
    pool: State<DbPool>,
    req: Option<ProductListReq>,
) -> Result<ProductListPage, AppError> {
    product_list(&pool, req.unwrap_or_default())
}

#[tauri::command]
pub fn cmd_product_update(
    pool: State<DbPool>,
    req: ProductUpdateReq,
) -> Result<ProductDto, AppError> {
    product_update(&pool, req)
}

#[tauri::command]
pub fn cmd_product_delete(pool: State<DbPool>, req: ProductGetReq) -> Result<(), AppError> {
    product_delete(&pool, &req.id)
}

#[tauri::command]
pub fn cmd_product_search_similar(
    pool: State<DbPool>,
    req: ProductSearchReq,
) -> Result<Vec<ProductMatchDto>, AppError> {
    product_search_similar(&pool, req)
}
