use axum::{response::Html, Json};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::proxy::handlers::{admin_tokens, content, usage};
use crate::proxy::health;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WriteFlow API",
        description = "Content generation, rewriting and translation behind a bearer token and a daily quota."
    ),
    paths(
        content::handle_generate,
        content::handle_rewrite,
        content::handle_translate,
        usage::handle_usage,
        health::health_check_handler,
        admin_tokens::admin_list_tokens,
        admin_tokens::admin_create_token,
        admin_tokens::admin_delete_token,
        admin_tokens::admin_reset_token,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "content", description = "AI writing operations, one quota unit per call"),
        (name = "account", description = "Caller quota"),
        (name = "admin", description = "Token management, master key only"),
        (name = "system", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

const SWAGGER_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>WriteFlow API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn docs_page() -> Html<&'static str> {
    Html(SWAGGER_PAGE)
}
