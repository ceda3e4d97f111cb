//! Resource fetch module
//!
//! Turns a parsed route into a response: consults the resolver (or the
//! format-dump fast path), verifies the resolved path on disk, and frames
//! the file bytes with the identifying header.

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::resolver::Resolver;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

use super::router::Route;

/// Resolve a route to a filesystem path and respond with the file bytes,
/// or with the not-found response when nothing resolves.
pub async fn fetch_resource(
    state: &Arc<AppState>,
    route: &Route,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let (path, id_header) = match route {
        Route::File { format, name } => {
            let path = if *name == state.config.resolver.format_dump {
                // The precompiled format dump lives next to the server and
                // is served straight from the working directory
                Some(PathBuf::from(name))
            } else {
                resolve_file(Arc::clone(&state.resolver), name.clone(), *format).await
            };
            (path, "fileid")
        }
        Route::Pk { dpi, name } => {
            let path = resolve_pk(Arc::clone(&state.resolver), name.clone(), *dpi).await;
            (path, "pkid")
        }
    };

    respond(state, path, id_header, is_head).await
}

/// Run a blocking `find_file` query off the async runtime
async fn resolve_file(resolver: Arc<dyn Resolver>, name: String, format: i64) -> Option<PathBuf> {
    tokio::task::spawn_blocking(move || resolver.find_file(&name, format))
        .await
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Resolver task failed: {e}"));
            None
        })
}

/// Run a blocking `find_pk` query off the async runtime
async fn resolve_pk(resolver: Arc<dyn Resolver>, name: String, dpi: u32) -> Option<PathBuf> {
    tokio::task::spawn_blocking(move || resolver.find_pk(&name, dpi))
        .await
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Resolver task failed: {e}"));
            None
        })
}

/// Respond with the bytes at `path`, or not-found.
///
/// "Resolver found nothing" and "resolved path absent from disk" are
/// deliberately indistinguishable to the client.
async fn respond(
    state: &Arc<AppState>,
    path: Option<PathBuf>,
    id_header: &'static str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let legacy = state.config.http.legacy_not_found;

    let Some(path) = path else {
        return http::build_not_found_response(legacy);
    };

    match fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return http::build_not_found_response(legacy),
    }

    let data = match fs::read(&path).await {
        Ok(data) => data,
        Err(e) => {
            logger::log_error(&format!("Failed to read '{}': {e}", path.display()));
            return http::build_not_found_response(legacy);
        }
    };

    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    http::build_file_response(data, &basename, id_header, is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::http::response::NOT_FOUND_BODY;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolver stub answering from fixed values and counting queries
    struct StubResolver {
        file: Option<PathBuf>,
        pk: Option<PathBuf>,
        calls: AtomicUsize,
    }

    impl StubResolver {
        fn new(file: Option<PathBuf>, pk: Option<PathBuf>) -> Arc<Self> {
            Arc::new(Self {
                file,
                pk,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Resolver for StubResolver {
        fn find_file(&self, _name: &str, _format: i64) -> Option<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.file.clone()
        }

        fn find_pk(&self, _name: &str, _dpi: u32) -> Option<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pk.clone()
        }
    }

    fn test_state(resolver: Arc<StubResolver>) -> Arc<AppState> {
        let config = Config::load_from("no-such-config-file").unwrap();
        Arc::new(AppState { config, resolver })
    }

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_resolver_miss_is_not_found() {
        let stub = StubResolver::new(None, None);
        let state = test_state(Arc::clone(&stub));

        let route = Route::Pk {
            dpi: 300,
            name: "cmr10".to_string(),
        };
        let resp = fetch_resource(&state, &route, false).await;
        assert_eq!(resp.status(), 404);
        assert_eq!(body_bytes(resp).await, NOT_FOUND_BODY.as_bytes());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dangling_resolved_path_is_not_found() {
        let stub = StubResolver::new(Some(PathBuf::from("/no/such/file.tfm")), None);
        let state = test_state(stub);

        let route = Route::File {
            format: 3,
            name: "cmr10.tfm".to_string(),
        };
        let resp = fetch_resource(&state, &route, false).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_resolved_file_streams_bytes_and_id_header() {
        let contents = b"\xf7\x02tfm bytes here";
        let path = temp_file("kpserve-test-cmr10.tfm", contents);
        let stub = StubResolver::new(Some(path.clone()), None);
        let state = test_state(stub);

        let route = Route::File {
            format: 3,
            name: "cmr10.tfm".to_string(),
        };
        let resp = fetch_resource(&state, &route, false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["fileid"], "kpserve-test-cmr10.tfm");
        assert_eq!(resp.headers()["Access-Control-Expose-Headers"], "fileid");
        assert_eq!(body_bytes(resp).await, &contents[..]);

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_pk_route_uses_pkid_header() {
        let path = temp_file("kpserve-test-cmr10.600pk", b"pk glyphs");
        let stub = StubResolver::new(None, Some(path.clone()));
        let state = test_state(stub);

        let route = Route::Pk {
            dpi: 600,
            name: "cmr10".to_string(),
        };
        let resp = fetch_resource(&state, &route, false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["pkid"], "kpserve-test-cmr10.600pk");
        assert_eq!(resp.headers()["Access-Control-Expose-Headers"], "pkid");

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_format_dump_bypasses_resolver() {
        // The dump name resolves to itself; the resolver is never consulted,
        // and with no such file in the working directory the answer is 404
        let stub = StubResolver::new(Some(PathBuf::from("/should/not/be/used")), None);
        let state = test_state(Arc::clone(&stub));

        let route = Route::File {
            format: 0,
            name: state.config.resolver.format_dump.clone(),
        };
        let resp = fetch_resource(&state, &route, false).await;
        assert_eq!(resp.status(), 404);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_format_dump_served_from_working_directory() {
        let stub = StubResolver::new(None, None);
        let config = {
            let mut c = Config::load_from("no-such-config-file").unwrap();
            c.resolver.format_dump = "kpserve-test-dump.fmt".to_string();
            c
        };
        let state = Arc::new(AppState {
            config,
            resolver: Arc::clone(&stub) as Arc<dyn Resolver>,
        });

        let cwd_path = std::env::current_dir().unwrap().join("kpserve-test-dump.fmt");
        std::fs::write(&cwd_path, b"format dump image").unwrap();

        let route = Route::File {
            format: 0,
            name: "kpserve-test-dump.fmt".to_string(),
        };
        let resp = fetch_resource(&state, &route, false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["fileid"], "kpserve-test-dump.fmt");
        assert_eq!(body_bytes(resp).await, b"format dump image".as_slice());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);

        std::fs::remove_file(cwd_path).unwrap();
    }

    #[tokio::test]
    async fn test_legacy_not_found_status() {
        let stub = StubResolver::new(None, None);
        let config = {
            let mut c = Config::load_from("no-such-config-file").unwrap();
            c.http.legacy_not_found = true;
            c
        };
        let state = Arc::new(AppState {
            config,
            resolver: stub,
        });

        let route = Route::Pk {
            dpi: 300,
            name: "cmr10".to_string(),
        };
        let resp = fetch_resource(&state, &route, false).await;
        assert_eq!(resp.status(), 301);
        assert_eq!(body_bytes(resp).await, NOT_FOUND_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_head_request_has_empty_body() {
        let path = temp_file("kpserve-test-head.tfm", b"some tfm bytes");
        let stub = StubResolver::new(Some(path.clone()), None);
        let state = test_state(stub);

        let route = Route::File {
            format: 3,
            name: "head.tfm".to_string(),
        };
        let resp = fetch_resource(&state, &route, true).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Length"], "14");
        assert!(body_bytes(resp).await.is_empty());

        std::fs::remove_file(path).unwrap();
    }
}
