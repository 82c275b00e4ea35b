// src/shared/spa_fallback.rs

use std::path::Path;

use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::HttpResponse;

use super::shared_structs::MessageResponse;

/// Static storefront files mounted at `/`. Paths with no matching file get
/// the entry page so client-side routing can take over.
pub fn storefront_files(static_dir: &Path) -> Files {
    let entry_page = static_dir.join("index.html");

    Files::new("/", static_dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let entry_page = entry_page.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(&entry_page).await?;
                let res = file.into_response(&req);
                Ok(ServiceResponse::new(req, res))
            }
        }))
}

/// Catch-all for unknown `/api/*` routes, so API typos never receive HTML.
pub async fn api_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(MessageResponse::new("Not found"))
}
