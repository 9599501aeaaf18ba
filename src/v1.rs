#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::http::{header, HeaderValue, Method};
use poem::middleware::{NormalizePath, TrailingSlash};
use poem::{Endpoint, EndpointExt, IntoResponse, Request, Response, Route};
use poem_openapi::{OpenApiService, Tags};

use greetings::GreetingsApi;
use items::catalog::Catalog;
use items::ItemsApi;
use version::VersionApi;

pub mod greetings;
pub mod items;
pub mod version;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const API_VERSION: &str = "1.0.0";

// ***************************************************************************
//                                  Tags
// ***************************************************************************
#[derive(Tags)]
pub enum ApiTags {
    /// Welcome and greeting endpoints.
    Greetings,
    /// Item creation and catalog listing.
    Items,
    /// Server information.
    Server,
}

// ---------------------------------------------------------------------------
// build_app:
// ---------------------------------------------------------------------------
/** Assemble every endpoint together with the generated API documentation:
 * Swagger UI at /docs and the OpenAPI document at /openapi.json and
 * /openapi.yaml.  Paths are matched with or without a trailing slash.
 */
pub fn build_app(catalog: Arc<Catalog>, title: &str, server_url: &str) -> impl Endpoint {
    let endpoints = (GreetingsApi, ItemsApi::new(catalog), VersionApi);
    let api_service =
        OpenApiService::new(endpoints, title, API_VERSION).server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/docs", ui)
        .at("/openapi.json", spec)
        .at("/openapi.yaml", spec_yaml)
        .nest("/", api_service)
        .with(NormalizePath::new(TrailingSlash::Trim))
        .around(default_json_content_type)
}

// ---------------------------------------------------------------------------
// default_json_content_type:
// ---------------------------------------------------------------------------
/** A POST body sent without a Content-Type header is read as JSON. */
async fn default_json_content_type<E: Endpoint>(ep: Arc<E>, mut req: Request) -> poem::Result<Response> {
    if req.method() == Method::POST && req.header(header::CONTENT_TYPE).is_none() {
        req.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    ep.call(req).await.map(IntoResponse::into_response)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::test::TestClient;
    use serde_json::Value;

    use super::*;

    fn client() -> TestClient<impl Endpoint> {
        TestClient::new(build_app(Arc::new(Catalog::default()), "Items Server", "http://localhost:8000"))
    }

    #[tokio::test]
    async fn all_routes_mounted() {
        let cli = client();
        cli.get("/").send().await.assert_status_is_ok();
        cli.get("/hello/Min").send().await.assert_status_is_ok();
        cli.get("/api/v1/items_list/").send().await.assert_status_is_ok();
        cli.get("/api/v1/items_list").send().await.assert_status_is_ok();
        cli.get("/version").send().await.assert_status_is_ok();
    }

    #[tokio::test]
    async fn openapi_document_describes_items_router() {
        let resp = client().get("/openapi.json").send().await;
        resp.assert_status_is_ok();
        let doc: Value = resp.0.into_body().into_json().await.unwrap();

        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/items"));
        assert!(paths.contains_key("/api/v1/items_list"));
        assert_eq!(doc["paths"]["/api/v1/items"]["post"]["tags"][0], "Items");

        let item = &doc["components"]["schemas"]["Item"];
        assert_eq!(item["properties"]["name"]["minLength"], 3);
        assert_eq!(item["properties"]["name"]["maxLength"], 50);
        assert_eq!(item["properties"]["description"]["maxLength"], 200);
    }

    #[tokio::test]
    async fn post_without_content_type_is_read_as_json() {
        let resp = client().post("/api/v1/items/")
            .body(r#"{"name": "Widget", "price": 3}"#)
            .send().await;
        resp.assert_status_is_ok();
        let body: Value = resp.0.into_body().into_json().await.unwrap();
        assert_eq!(body["name"], "Widget");
    }
}
