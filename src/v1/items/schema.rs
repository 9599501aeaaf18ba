#![forbid(unsafe_code)]

use poem_openapi::types::ToJSON;
use poem_openapi::Object;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::utils::errors::{HttpValidationError, ValidationErrorDetail};

// ***************************************************************************
//                                Item Schema
// ***************************************************************************
/// A sellable item submitted by a client.
#[derive(Object, Validate, Debug, Clone, PartialEq)]
pub struct Item {
    /// Item name, 3 to 50 characters.
    #[oai(validator(min_length = 3, max_length = 50))]
    #[validate(length(min = 3, max = 50))]
    pub name: String,
    /// Optional description, at most 200 characters.
    #[oai(validator(max_length = 200))]
    #[validate(length(max = 200))]
    pub description: Option<String>,
    /// Unit price, strictly greater than zero.
    #[oai(validator(minimum(value = "0", exclusive = true)))]
    #[validate(range(exclusive_min = 0.0, code = "greater_than",
                     message = "Input should be greater than 0"))]
    pub price: f64,
    /// Optional tax, zero or greater.
    #[oai(validator(minimum(value = "0")))]
    #[validate(range(min = 0.0, code = "greater_than_equal",
                     message = "Input should be greater than or equal to 0"))]
    pub tax: Option<f64>,
}

// ---------------------------------------------------------------------------
// Field shapes:
// ---------------------------------------------------------------------------
// JSON type and presence of each declared field, in schema order.  Value
// constraints live on Item itself.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Number,
}

#[derive(Debug)]
struct FieldShape {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

static ITEM_FIELDS: [FieldShape; 4] = [
    FieldShape {name: "name", kind: FieldKind::Text, required: true},
    FieldShape {name: "description", kind: FieldKind::Text, required: false},
    FieldShape {name: "price", kind: FieldKind::Number, required: true},
    FieldShape {name: "tax", kind: FieldKind::Number, required: false},
];

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
impl Item {
    /// Names of the fields an Item exposes, in schema order.
    pub fn field_names() -> impl Iterator<Item = &'static str> {
        ITEM_FIELDS.iter().map(|f| f.name)
    }

    /// Convert to a plain internal record that callers may extend freely.
    pub fn to_record(&self) -> Map<String, Value> {
        match self.to_json() {
            Some(Value::Object(m)) => m,
            _ => Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// parse_item_body:
// ---------------------------------------------------------------------------
/** Parse raw request body bytes and validate them as an Item.  An empty body
 * is reported as a missing body rather than as bad JSON.
 */
pub fn parse_item_body(data: &[u8]) -> Result<Item, HttpValidationError> {
    if data.is_empty() {
        return Err(HttpValidationError::new(vec![ValidationErrorDetail::new(
            &["body"], "Field required", "missing")]));
    }
    match serde_json::from_slice::<Value>(data) {
        Ok(value) => validate_item(&value),
        Err(e) => Err(HttpValidationError::new(vec![ValidationErrorDetail::new(
            &["body"], format!("JSON decode error: {}", e), "json_invalid")])),
    }
}

// ---------------------------------------------------------------------------
// validate_item:
// ---------------------------------------------------------------------------
/** Validate an arbitrary JSON value against the Item schema.  Every violated
 * field is reported.  Fields the schema does not declare are ignored.
 */
pub fn validate_item(value: &Value) -> Result<Item, HttpValidationError> {
    let input = match value {
        Value::Object(m) => m,
        _ => return Err(HttpValidationError::new(vec![ValidationErrorDetail::new(
            &["body"], "Input should be a valid dictionary or object to extract fields from",
            "model_attributes_type")])),
    };

    // A field with a missing or mistyped value reports only that problem.
    let mut errors: Vec<(usize, ValidationErrorDetail)> = vec![];
    for (pos, shape) in ITEM_FIELDS.iter().enumerate() {
        if let Some(e) = check_shape(shape, input.get(shape.name)) {
            errors.push((pos, e));
        }
    }

    let item = Item {
        name: input.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
        description: input.get("description").and_then(Value::as_str).map(str::to_string),
        price: input.get("price").and_then(Value::as_f64).unwrap_or_default(),
        tax: input.get("tax").and_then(Value::as_f64),
    };

    if let Err(e) = item.validate() {
        let mistyped: Vec<usize> = errors.iter().map(|(pos, _)| *pos).collect();
        errors.extend(constraint_errors(input, &e).into_iter().filter(|(pos, _)| !mistyped.contains(pos)));
    }

    if errors.is_empty() {
        return Ok(item);
    }
    errors.sort_by_key(|(pos, _)| *pos);
    Err(HttpValidationError::new(errors.into_iter().map(|(_, d)| d).collect()))
}

// ---------------------------------------------------------------------------
// project:
// ---------------------------------------------------------------------------
/** Whitelist the declared Item fields of an internal record before it crosses
 * the service boundary.  Any extra attributes carried by the record are
 * dropped and the remainder is validated again.
 */
pub fn project(record: &Map<String, Value>) -> Result<Item, HttpValidationError> {
    let declared: Map<String, Value> = Item::field_names()
        .filter_map(|name| record.get(name).map(|v| (name.to_string(), v.clone())))
        .collect();
    validate_item(&Value::Object(declared))
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// check_shape:
// ---------------------------------------------------------------------------
/** Report a required field that is absent or null, or a value of the wrong
 * JSON type.
 */
fn check_shape(shape: &FieldShape, value: Option<&Value>) -> Option<ValidationErrorDetail> {
    let loc = ["body", shape.name];
    match (value, shape.kind) {
        (None | Some(Value::Null), _) if shape.required =>
            Some(ValidationErrorDetail::new(&loc, "Field required", "missing")),
        (None | Some(Value::Null), _) => None,
        (Some(Value::String(_)), FieldKind::Text) => None,
        (Some(Value::Number(_)), FieldKind::Number) => None,
        (Some(_), FieldKind::Text) =>
            Some(ValidationErrorDetail::new(&loc, "Input should be a valid string", "string_type")),
        (Some(_), FieldKind::Number) =>
            Some(ValidationErrorDetail::new(&loc, "Input should be a valid number", "float_type")),
    }
}

// ---------------------------------------------------------------------------
// constraint_errors:
// ---------------------------------------------------------------------------
/** Flatten the validator's per-field errors into response details, tagged
 * with the field's schema position.
 */
fn constraint_errors(input: &Map<String, Value>, errors: &ValidationErrors) -> Vec<(usize, ValidationErrorDetail)> {
    let by_field = errors.field_errors();
    let mut details = vec![];
    for (pos, name) in Item::field_names().enumerate() {
        if let Some(field_errors) = by_field.get(name) {
            let text = input.get(name).and_then(Value::as_str);
            for e in field_errors.iter() {
                details.push((pos, constraint_detail(name, text, e)));
            }
        }
    }
    details
}

/** Length failures are split into too short and too long by the submitted
 * text.  Range failures carry their own code and message.
 */
fn constraint_detail(field: &str, text: Option<&str>, err: &ValidationError) -> ValidationErrorDetail {
    let loc = ["body", field];
    match &*err.code {
        "length" => {
            let bound = |key: &str| err.params.get(key).and_then(Value::as_u64);
            let len = text.map_or(0, |s| s.chars().count() as u64);
            match bound("min") {
                Some(min) if len < min => ValidationErrorDetail::new(
                    &loc, format!("String should have at least {} characters", min), "string_too_short"),
                _ => ValidationErrorDetail::new(
                    &loc, format!("String should have at most {} characters", bound("max").unwrap_or_default()),
                    "string_too_long"),
            }
        }
        code => ValidationErrorDetail::new(&loc, err.message.as_deref().unwrap_or(code), code),
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(err: &HttpValidationError) -> Vec<(String, String)> {
        err.detail.iter().map(|d| (d.loc.join("."), d.kind.clone())).collect()
    }

    #[test]
    fn valid_item_accepted() {
        let item = validate_item(&json!({"name": "노트북", "price": 1200.5})).unwrap();
        assert_eq!(item.name, "노트북");
        assert_eq!(item.price, 1200.5);
        assert_eq!(item.description, None);
        assert_eq!(item.tax, None);
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(validate_item(&json!({"name": "abc", "price": 0.01, "tax": 0})).is_ok());
        let fifty = "가".repeat(50);
        assert!(validate_item(&json!({"name": fifty, "price": 1})).is_ok());
    }

    #[test]
    fn extra_fields_ignored() {
        let item = validate_item(&json!({
            "name": "Widget", "description": "blue", "price": 3, "tax": 1, "color": "red"
        })).unwrap();
        let mut keys: Vec<String> = item.to_record().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["description", "name", "price", "tax"]);
    }

    #[test]
    fn zero_price_rejected() {
        let err = validate_item(&json!({"name": "Widget", "price": 0})).unwrap_err();
        assert_eq!(kinds(&err), vec![("body.price".to_string(), "greater_than".to_string())]);
    }

    #[test]
    fn short_name_rejected() {
        let err = validate_item(&json!({"name": "ab", "price": 1})).unwrap_err();
        assert_eq!(kinds(&err), vec![("body.name".to_string(), "string_too_short".to_string())]);
    }

    #[test]
    fn long_name_counts_characters() {
        let err = validate_item(&json!({"name": "가".repeat(51), "price": 1})).unwrap_err();
        assert_eq!(err.detail[0].kind, "string_too_long");
    }

    #[test]
    fn every_violation_reported() {
        let err = validate_item(&json!({
            "name": 5, "description": "d".repeat(201), "price": -1, "tax": -0.5
        })).unwrap_err();
        assert_eq!(kinds(&err), vec![
            ("body.name".to_string(), "string_type".to_string()),
            ("body.description".to_string(), "string_too_long".to_string()),
            ("body.price".to_string(), "greater_than".to_string()),
            ("body.tax".to_string(), "greater_than_equal".to_string()),
        ]);
    }

    #[test]
    fn missing_fields_reported() {
        let err = validate_item(&json!({"description": null})).unwrap_err();
        assert_eq!(kinds(&err), vec![
            ("body.name".to_string(), "missing".to_string()),
            ("body.price".to_string(), "missing".to_string()),
        ]);
    }

    #[test]
    fn non_object_and_bad_json_rejected() {
        assert_eq!(validate_item(&json!([1, 2])).unwrap_err().detail[0].kind, "model_attributes_type");
        assert_eq!(parse_item_body(b"{not json").unwrap_err().detail[0].kind, "json_invalid");
    }

    #[test]
    fn empty_body_is_missing() {
        let err = parse_item_body(b"").unwrap_err();
        assert_eq!(err.detail.len(), 1);
        assert_eq!(err.detail[0].loc, vec!["body".to_string()]);
        assert_eq!(err.detail[0].kind, "missing");
    }

    #[test]
    fn constraint_messages_name_the_bound() {
        let err = validate_item(&json!({"name": "ab", "price": 0, "tax": -1})).unwrap_err();
        let msgs: Vec<&str> = err.detail.iter().map(|d| d.msg.as_str()).collect();
        assert_eq!(msgs, vec![
            "String should have at least 3 characters",
            "Input should be greater than 0",
            "Input should be greater than or equal to 0",
        ]);
    }

    #[test]
    fn mistyped_field_skips_constraint_check() {
        let err = validate_item(&json!({"name": "Widget", "price": "free"})).unwrap_err();
        assert_eq!(kinds(&err), vec![("body.price".to_string(), "float_type".to_string())]);
    }

    #[test]
    fn projection_drops_extra_attributes() {
        let item = validate_item(&json!({"name": "Widget", "price": 3, "tax": 0.3})).unwrap();
        let mut record = item.to_record();
        record.insert("secret_code".to_string(), json!("123456"));
        record.insert("status".to_string(), json!("processing"));

        let projected = project(&record).unwrap();
        assert_eq!(projected, item);
        assert_eq!(projected.to_json(), item.to_json());
    }
}
