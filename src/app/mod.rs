//! Application use cases and transactions.

mod product;
mod ticket;

pub use product::{
    product_create, product_delete, product_get, product_list, product_search_similar,
    product_update, ProductCreateReq, ProductDto, ProductListPage, ProductListReq,
    ProductMatchDto, ProductSearchReq, ProductUpdateReq,
};
pub use ticket::{
    ticket_cancel, ticket_create, ticket_get, ticket_list, TicketCreateReq, TicketDetailDto,
    TicketItemDto, TicketItemReq, TicketListItemDto, TicketListPage, TicketListReq,
    STATUS_CANCELLED, STATUS_ISSUED,
};
