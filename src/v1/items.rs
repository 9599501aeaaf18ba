#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{param::Query, OpenApi};

use crate::v1::ApiTags;
use catalog::Catalog;
use create_item::{CreateItemResponse, ItemBody};
use list_items::{default_limit, default_skip, ListItemsResponse, QueryParameters};

pub mod catalog;
pub mod create_item;
pub mod list_items;
pub mod schema;

// ***************************************************************************
//                               Items Router
// ***************************************************************************
/** Item creation and catalog listing, mounted under `/api/v1`.  The catalog
 * is supplied by the caller and only ever read.
 */
pub struct ItemsApi {
    catalog: Arc<Catalog>,
}

impl ItemsApi {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {catalog}
    }
}

// ***************************************************************************
//                             OpenAPI Endpoints
// ***************************************************************************
#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Items")]
impl ItemsApi {
    /// Create an item
    ///
    /// Validates the body against the Item schema.  Only the Item fields are
    /// returned, whatever else the request contained.
    #[oai(path = "/items", method = "post")]
    async fn create_item(&self, http_req: &Request, body: ItemBody) -> CreateItemResponse {
        create_item::process(http_req, body)
    }

    /// List catalog entries
    ///
    /// Filters entry names by `q` (case-insensitive substring) and returns
    /// at most `limit` matches after skipping the first `skip`.
    #[oai(path = "/items_list", method = "get")]
    async fn list_items(&self, http_req: &Request,
                        q: Query<Option<String>>,
                        #[oai(default = "default_skip")] skip: Query<i64>,
                        #[oai(default = "default_limit")] limit: Query<i64>,
                       ) -> ListItemsResponse {
        let query = QueryParameters {q: q.0, skip: skip.0, limit: limit.0};
        list_items::process(http_req, &self.catalog, query)
    }
}
