#![forbid(unsafe_code)]

use poem::{FromRequest, Request, RequestBody};
use poem_openapi::payload::{Json, ParsePayload, Payload};
use poem_openapi::registry::{MetaSchemaRef, Registry};
use poem_openapi::types::Type;
use poem_openapi::{impl_apirequest_for_payload, ApiResponse};
use rand::Rng;
use serde_json::Value;
use log::{error, info};

use crate::utils::errors::{validation_error_from, HttpValidationError};
use crate::utils::server_utils::{self, RequestDebug};
use super::schema::{self, Item};

// ***************************************************************************
//                                Constants
// ***************************************************************************
const STATUS_PROCESSING: &str = "processing";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
// ---------------------------------------------------------------------------
// ItemBody:
// ---------------------------------------------------------------------------
/** JSON request body documented as an Item.  Parsing never stops at the
 * first bad field; the outcome of validating the whole body is carried to
 * the handler so that every violation can be returned together.
 */
pub struct ItemBody(pub Result<Item, HttpValidationError>);

impl Payload for ItemBody {
    const CONTENT_TYPE: &'static str = "application/json; charset=utf-8";

    fn check_content_type(content_type: &str) -> bool {
        <Json<Item> as Payload>::check_content_type(content_type)
    }

    fn schema_ref() -> MetaSchemaRef {
        Item::schema_ref()
    }

    fn register(registry: &mut Registry) {
        Item::register(registry);
    }
}

impl ParsePayload for ItemBody {
    const IS_REQUIRED: bool = true;

    async fn from_request(request: &Request, body: &mut RequestBody) -> poem::Result<Self> {
        let data = Vec::<u8>::from_request(request, body).await?;
        Ok(Self(schema::parse_item_body(&data)))
    }
}

impl_apirequest_for_payload!(ItemBody);

// Implement the debug record trait for logging.
impl RequestDebug for Item {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    name: ");
        s.push_str(&self.name);
        s.push_str("\n    description: ");
        s.push_str(self.description.as_deref().unwrap_or("None"));
        s.push_str("\n    price: ");
        s.push_str(&self.price.to_string());
        s.push_str("\n    tax: ");
        s.push_str(&self.tax.map_or("None".to_string(), |t| t.to_string()));
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "bad_request_handler")]
pub enum CreateItemResponse {
    /// The created item, limited to the declared Item fields.
    #[oai(status = 200)]
    Http200(Json<Item>),
    /// One entry per rejected field.
    #[oai(status = 422)]
    Http422(Json<HttpValidationError>),
}

fn make_http_200(resp: Item) -> CreateItemResponse {
    CreateItemResponse::Http200(Json(resp))
}
fn make_http_422(err: HttpValidationError) -> CreateItemResponse {
    CreateItemResponse::Http422(Json(err))
}

fn bad_request_handler(err: poem::Error) -> CreateItemResponse {
    make_http_422(validation_error_from(&err))
}

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// process:
// ---------------------------------------------------------------------------
/** Accept a new item.  The internal record is augmented with fields that are
 * only ever logged; the response is the record projected back onto the
 * declared Item shape.
 */
pub fn process(http_req: &Request, body: ItemBody) -> CreateItemResponse {
    let item = match body.0 {
        Ok(item) => item,
        Err(e) => {
            error!("Item rejected: {} invalid field(s).", e.detail.len());
            return make_http_422(e);
        }
    };

    // Conditional logging depending on log level.
    server_utils::debug_request(http_req, &item);

    let record = augment(&item);
    info!("Creating item: {}", Value::Object(record.clone()));

    // Only the declared Item fields leave the service.
    match schema::project(&record) {
        Ok(item) => make_http_200(item),
        Err(e) => make_http_422(e),
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// augment:
// ---------------------------------------------------------------------------
/** Build the internal record for an item, which carries attributes that the
 * Item schema does not declare.
 */
fn augment(item: &Item) -> serde_json::Map<String, Value> {
    let mut record = item.to_record();
    record.insert("secret_code".to_string(), Value::String(new_secret_code()));
    record.insert("status".to_string(), Value::String(STATUS_PROCESSING.to_string()));
    record
}

fn new_secret_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use poem_openapi::types::ToJSON;
    use serde_json::json;

    fn sample() -> Item {
        schema::validate_item(&json!({"name": "Widget", "description": "small", "price": 9.5, "tax": 0.5})).unwrap()
    }

    #[test]
    fn augmented_record_carries_internal_fields() {
        let record = augment(&sample());
        assert_eq!(record.get("status"), Some(&json!("processing")));
        let code = record.get("secret_code").and_then(Value::as_str).unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn projected_record_matches_original_item() {
        let item = sample();
        let projected = schema::project(&augment(&item)).unwrap();
        assert_eq!(projected.to_json(), item.to_json());
    }

    #[test]
    fn invalid_body_is_422() {
        let body = ItemBody(schema::parse_item_body(br#"{"name": "ab", "price": 0}"#));
        match process(&Request::default(), body) {
            CreateItemResponse::Http422(Json(e)) => assert_eq!(e.detail.len(), 2),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn valid_body_returns_item() {
        let body = ItemBody(Ok(sample()));
        match process(&Request::default(), body) {
            CreateItemResponse::Http200(Json(item)) => assert_eq!(item, sample()),
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
