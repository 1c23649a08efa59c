use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    add_module_files, create_module, delete_module_file, get_module, list_modules,
    module_file_url, update_module, upload_source_pdf,
};
use crate::app_state::AppState;

pub fn module_routes() -> Router<AppState> {
    Router::new()
        .route("/modules", get(list_modules))
        .route("/modules", post(create_module))
        .route("/modules/:id", get(get_module))
        .route("/modules/:id", put(update_module))
        .route("/modules/:id/source-pdf", post(upload_source_pdf))
        .route("/modules/:id/files", post(add_module_files))
        .route("/modules/:id/files", delete(delete_module_file))
        .route("/modules/:id/files/url", get(module_file_url))
}
