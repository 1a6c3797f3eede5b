use crate::app::{
    ticket_cancel, ticket_create, ticket_get, ticket_list, TicketCreateReq, TicketDetailDto,
    TicketListPage, TicketListReq,
};
use crate::error::AppError;
use crate::infra::DbPool;
use serde::Deserialize;
use tauri::State;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketGetReq {
    pub id: String,
}

#[tauri::command]
pub fn cmd_ticket_create(
    pool: State<DbPool>,
    req: TicketCreateReq,
) -> Result<TicketDetailDto, AppError> {
    ticket_create(&pool, req)
}

#[tauri::command]
pub fn cmd_ticket_get(pool: State<DbPool>, req: TicketGetReq) -> Result<TicketDetailDto, AppError> {
    ticket_get(&pool, &req.id)
}

#[tauri::command]
pub fn cmd_ticket_list(
    pool: State<DbPool>,
    req: Option<TicketListReq>,
) -> Result<TicketListPage, AppError> {
    ticket_list(&pool, req.unwrap_or_default())
}

#[tauri::command]
pub fn cmd_ticket_cancel(
    pool: State<DbPool>,
    req: TicketGetReq,
) -> Result<TicketDetailDto, AppError> {
    ticket_cancel(&pool, &req.id)
}
