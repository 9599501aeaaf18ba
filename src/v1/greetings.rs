#![forbid(unsafe_code)]

use poem_openapi::{param::Path, payload::Json, Object, OpenApi};

use crate::v1::ApiTags;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const WELCOME_MESSAGE: &str = "Hello World!!!, Items Server 세상에 오신 것을 환영합니다.";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct GreetingsApi;

#[derive(Object, Debug)]
struct RespMessage
{
    message: String,
}

// ***************************************************************************
//                             OpenAPI Endpoints
// ***************************************************************************
#[OpenApi(tag = "ApiTags::Greetings")]
impl GreetingsApi {
    /// Welcome message
    #[oai(path = "/", method = "get")]
    async fn read_root(&self) -> Json<RespMessage> {
        Json(RespMessage::new(WELCOME_MESSAGE.to_string()))
    }

    /// Greet a caller by name
    #[oai(path = "/hello/:name", method = "get")]
    async fn say_hello(&self, name: Path<String>) -> Json<RespMessage> {
        Json(RespMessage::new(greeting(&name.0)))
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespMessage {
    fn new(message: String) -> Self {
        Self {message}
    }
}

fn greeting(name: &str) -> String {
    format!("안녕하세요, {}님! 반갑습니다.", name)
}
