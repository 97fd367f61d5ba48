#![allow(dead_code)]

use std::sync::Arc;

use switchyard::dispatcher::{HandlerRequest, HandlerResponse};
use switchyard::{HandlerRegistry, NameResolver, Router, RouterConfig};

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Temporary file with the given extension; removed when dropped
    pub fn create_temp(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("switchyard_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp(content, "yaml")
    }
}

/// Handler answering with the merged params, the path it saw and its mount prefix
pub fn echo(req: HandlerRequest) -> HandlerResponse {
    HandlerResponse::json(
        200,
        serde_json::json!({
            "route": req.route_name,
            "path": req.path,
            "mount_prefix": req.mount_prefix,
            "params": req.params_map(),
        }),
    )
}

/// Handler answering with a fixed text body
pub fn text(body: &'static str) -> impl Fn(HandlerRequest) -> HandlerResponse + Send + Sync {
    move |_req: HandlerRequest| HandlerResponse::text(200, body)
}

/// Router with default config backed by a fresh registry
pub fn router() -> (Router, Arc<HandlerRegistry>) {
    let registry = Arc::new(HandlerRegistry::new());
    let router = Router::new(
        RouterConfig::default(),
        Arc::clone(&registry) as Arc<dyn NameResolver>,
    );
    (router, registry)
}
