#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{payload::Json, ApiResponse, Object};

use crate::utils::errors::{validation_error_from, HttpValidationError};
use crate::utils::server_utils::{self, RequestDebug};
use super::catalog::{Catalog, CatalogEntry};

// ***************************************************************************
//                                Constants
// ***************************************************************************
pub const DEFAULT_SKIP  : i64 = 0;
pub const DEFAULT_LIMIT : i64 = 10;

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
/// Query parameters as received, echoed back in the response.
#[derive(Object, Debug, Clone, PartialEq)]
pub struct QueryParameters {
    pub q: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

/// One page of catalog entries.
#[derive(Object, Debug, Clone, PartialEq)]
pub struct ItemsPage {
    pub query_parameters: QueryParameters,
    pub items_on_this_page: Vec<CatalogEntry>,
}

// Implement the debug record trait for logging.
impl RequestDebug for QueryParameters {
    fn get_request_info(&self) -> String {
        format!("  Request parameters:\n    q: {:?}\n    skip: {}\n    limit: {}",
                self.q, self.skip, self.limit)
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
pub enum ListItemsResponse {
    #[oai(status = 200)]
    Http200(Json<ItemsPage>),
    /// A query parameter could not be coerced to its declared type.
    #[oai(status = 422)]
    Http422(Json<HttpValidationError>),
}

fn make_http_200(resp: ItemsPage) -> ListItemsResponse {
    ListItemsResponse::Http200(Json(resp))
}

fn bad_request_handler(err: poem::Error) -> ListItemsResponse {
    ListItemsResponse::Http422(Json(validation_error_from(&err)))
}

pub fn default_skip() -> i64 {
    DEFAULT_SKIP
}

pub fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// process:
// ---------------------------------------------------------------------------
pub fn process(http_req: &Request, catalog: &Catalog, query: QueryParameters) -> ListItemsResponse {
    // Conditional logging depending on log level.
    server_utils::debug_request(http_req, &query);

    let items_on_this_page = catalog.search(query.q.as_deref(), query.skip, query.limit);
    make_http_200(ItemsPage {query_parameters: query, items_on_this_page})
}
