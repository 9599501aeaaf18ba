#![forbid(unsafe_code)]

use poem_openapi::{OpenApi, payload::Json, Object};

use crate::utils::server_utils::timestamp_str;
use crate::v1::ApiTags;

// From cargo.toml.
const SERVER_VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct VersionApi;

#[derive(Object, Debug)]
struct RespVersion
{
    result_code: String,
    result_msg: String,
    server_version: String,
    rustc_version: String,
    server_time: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi(tag = "ApiTags::Server")]
impl VersionApi {
    /// Build information
    #[oai(path = "/version", method = "get")]
    async fn get_version(&self) -> Json<RespVersion> {
        Json(RespVersion::process())
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespVersion {
    fn new(result_code: &str, result_msg: &str, server: &str, rustc: &str, ts: String) -> Self {
        Self {result_code: result_code.to_string(),
              result_msg: result_msg.to_string(),
              server_version: server.to_string(),
              rustc_version: rustc.to_string(),
              server_time: ts,
        }
    }

    fn process() -> RespVersion {
        Self::new("0",
                  "success",
                  SERVER_VERSION.unwrap_or("unknown"),
                  env!("RUSTC_VERSION"),
                  timestamp_str())
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::test::TestClient;
    use poem::Route;
    use poem_openapi::OpenApiService;
    use serde_json::Value;

    use super::*;

    #[tokio::test]
    async fn version_reports_package_version() {
        let cli = TestClient::new(Route::new().nest("/", OpenApiService::new(VersionApi, "Version", "test")));
        let resp = cli.get("/version").send().await;
        resp.assert_status_is_ok();
        let body: Value = resp.0.into_body().into_json().await.unwrap();
        assert_eq!(body["result_code"], "0");
        assert_eq!(body["server_version"], env!("CARGO_PKG_VERSION"));
    }
}
