//! HTTP relay between the console and the flashrom utility
//!
//! Routes:
//! - `POST /api/flashrom` runs one operation and answers with `{msg, out}`
//! - `GET /outputs/{file}` serves chip dumps produced by read
//! - `GET /` and `GET /{page}` render the layout page hosting the console
//! - `GET /pkg/{file}` serves the compiled front-end bundle

mod page;

use crate::cli::ServeArgs;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use flashweb_core::form::{
    FIELD_ACTION, FIELD_FILE, FIELD_FORCE, FIELD_PROGRAMMER, FIELD_VERBOSE,
};
use flashweb_core::ExecResponse;
use flashweb_runner::{
    ExecResult, FlashromService, RunnerError, ShellCommandAdapter, MAX_VERBOSITY,
};
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

/// URL prefix artifacts are served under
pub const OUTPUTS_PREFIX: &str = "/outputs/";

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Where uploaded images are staged
    pub input_dir: PathBuf,
    /// Where chip dumps are written
    pub output_dir: PathBuf,
    /// Compiled front-end bundle, if any
    pub static_dir: Option<PathBuf>,
    /// flashrom executable
    pub flashrom: PathBuf,
    /// Arguments placed before the generated flashrom arguments
    pub flashrom_args: Vec<String>,
    /// Request body limit in bytes
    pub max_upload: usize,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            input_dir: args.input_dir,
            output_dir: args.output_dir,
            static_dir: args.static_dir,
            flashrom: args.flashrom,
            flashrom_args: args.flashrom_args,
            max_upload: args.max_upload_mib.saturating_mul(1024 * 1024),
        }
    }
}

#[derive(Clone)]
struct AppState {
    config: Arc<ServerConfig>,
}

/// Build the application router
pub fn build_router(config: ServerConfig) -> Router {
    let max_upload = config.max_upload;
    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/api/flashrom", post(run_operation))
        .route("/outputs/:file", get(get_output))
        .route("/pkg/:file", get(get_asset))
        .route("/", get(index))
        .route("/:page", get(get_page))
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Create the working directories and serve until the process is stopped
pub async fn serve(
    config: ServerConfig,
    bind: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(&config.input_dir).await?;
    tokio::fs::create_dir_all(&config.output_dir).await?;
    log::info!("Staging uploads in {:?}", config.input_dir);
    log::info!("Writing chip dumps to {:?}", config.output_dir);
    match &config.static_dir {
        Some(dir) => log::info!("Serving front-end from {:?}", dir),
        None => log::warn!("No --static-dir given, the console page will not load"),
    }

    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(config)).await?;
    Ok(())
}

/// Fields of one submission, as received
#[derive(Debug, Default)]
struct RelayForm {
    action: Option<String>,
    programmer: Option<String>,
    file: Option<Vec<u8>>,
    force: bool,
    verbose: bool,
}

impl RelayForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                FIELD_ACTION => form.action = Some(field.text().await?),
                FIELD_PROGRAMMER => form.programmer = Some(field.text().await?),
                FIELD_FILE => form.file = Some(field.bytes().await?.to_vec()),
                FIELD_FORCE => form.force = true,
                FIELD_VERBOSE => form.verbose = true,
                other => log::debug!("Ignoring form field {:?}", other),
            }
        }
        Ok(form)
    }
}

/// Validate the submission and run flashrom; blocks until the tool exits
fn run_flashrom(config: &ServerConfig, form: RelayForm) -> Result<ExecResult, RunnerError> {
    let adapter = ShellCommandAdapter::new(&config.flashrom, &config.output_dir)
        .with_prefix_args(&config.flashrom_args);
    let mut service = FlashromService::new(adapter, &config.input_dir);

    service.set_action(form.action.as_deref().unwrap_or_default())?;
    service.set_programmer(form.programmer.unwrap_or_default());
    // A file input left empty arrives as a zero-length part
    if let Some(data) = form.file.filter(|data| !data.is_empty()) {
        service.set_file(&data)?;
    }
    if form.force {
        service.set_force();
    }
    if form.verbose {
        service.set_verbosity(MAX_VERBOSITY)?;
    }
    service.execute()
}

async fn run_operation(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match RelayForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("Malformed submission: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let config = Arc::clone(&state.config);
    match tokio::task::spawn_blocking(move || run_flashrom(&config, form)).await {
        Ok(Ok(result)) => Json(ExecResponse {
            msg: result.message,
            out: result.artifact.map(|name| format!("{}{}", OUTPUTS_PREFIX, name)),
        })
        .into_response(),
        Ok(Err(e)) if e.is_client_error() => {
            log::warn!("Rejected submission: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Ok(Err(e)) => {
            log::error!("Operation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            log::error!("Runner task aborted: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to execute flashrom utility.".to_string(),
            )
                .into_response()
        }
    }
}

async fn get_output(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    let mut response = serve_file(&state.config.output_dir, &file).await;
    if response.status().is_success() {
        let disposition = format!("attachment; filename=\"{}\"", file);
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
        }
    }
    response
}

async fn get_asset(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    match &state.config.static_dir {
        Some(dir) => serve_file(dir, &file).await,
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn index() -> Response {
    get_page(Path(page::DEFAULT_PAGE.to_string())).await
}

async fn get_page(Path(name): Path<String>) -> Response {
    match page::render(&name) {
        Some(html) => Html(html).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A single path component naming a file inside the served directory
///
/// Quotes are refused so the name can sit inside `filename="..."`.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0', '"'])
}

fn content_type(name: &str) -> &'static str {
    match FsPath::new(name).extension().and_then(|e| e.to_str()) {
        Some("wasm") => "application/wasm",
        Some("js") => "text/javascript",
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

async fn serve_file(dir: &FsPath, name: &str) -> Response {
    if !is_plain_file_name(name) {
        log::warn!("Refusing to serve {:?}", name);
        return StatusCode::NOT_FOUND.into_response();
    }

    match tokio::fs::read(dir.join(name)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(name))], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            log::error!("Failed to read {:?}: {}", dir.join(name), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use flashweb_client::{submit, HttpTransport};
    use flashweb_core::{Action, Console, FileUpload, NotificationKind, OperationResult};
    use crate::server::testing::{config, start_server, DUMP_CHIP};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn post_form(addr: SocketAddr, form: reqwest::multipart::Form) -> (u16, String) {
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/flashrom", addr))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }

    const ECHO_ARGS: &str = r#"echo "args: $*""#;


    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("dump.bin"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../secret"));
        assert!(!is_plain_file_name("a\\b"));
        assert!(!is_plain_file_name("a\"b.bin"));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type("flashweb_wasm_bg.wasm"), "application/wasm");
        assert_eq!(content_type("flashweb_wasm.js"), "text/javascript");
        assert_eq!(content_type("dump.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_index_renders_home() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(build_router(config(&dir, ECHO_ARGS)), "/").await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("<title>Home - flashweb</title>"));
        assert!(html.contains("flashweb_canvas"));
    }

    #[tokio::test]
    async fn test_named_and_unknown_pages() {
        let dir = TempDir::new().unwrap();
        let router = build_router(config(&dir, ECHO_ARGS));
        let (status, body) = get(router.clone(), "/about").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("<title>About - flashweb</title>"));

        let (status, _) = get(router, "/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serves_outputs() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, ECHO_ARGS);
        std::fs::write(cfg.output_dir.join("dump.bin"), b"\x01\x02\x03").unwrap();
        std::fs::write(dir.path().join("secret"), b"nope").unwrap();
        let router = build_router(cfg);

        let (status, body) = get(router.clone(), "/outputs/dump.bin").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"\x01\x02\x03");

        let (status, _) = get(router.clone(), "/outputs/missing.bin").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(router, "/outputs/..%2Fsecret").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_outputs_are_attachments() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, ECHO_ARGS);
        std::fs::write(cfg.output_dir.join("dump.bin"), b"DUMP").unwrap();
        let response = build_router(cfg)
            .oneshot(Request::builder().uri("/outputs/dump.bin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"dump.bin\""
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_quoted_output_name_not_served() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, ECHO_ARGS);
        std::fs::write(cfg.output_dir.join("a\"b.bin"), b"DUMP").unwrap();
        let (status, _) = get(build_router(cfg), "/outputs/a%22b.bin").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_assets_need_static_dir() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir, ECHO_ARGS);
        let (status, _) = get(build_router(cfg.clone()), "/pkg/flashweb_wasm.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let pkg = dir.path().join("pkg");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join("flashweb_wasm.js"), "export default function init() {}").unwrap();
        cfg.static_dir = Some(pkg);
        let response = build_router(cfg)
            .oneshot(Request::builder().uri("/pkg/flashweb_wasm.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/javascript");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_runs_tool() {
        let dir = TempDir::new().unwrap();
        let (addr, _handle) = start_server(build_router(config(&dir, ECHO_ARGS))).await;

        let form = reqwest::multipart::Form::new()
            .text("programmer", "dummy")
            .text("action", "probe")
            .text("very-very-verbose", "on");
        let (status, body) = post_form(addr, form).await;
        assert_eq!(status, 200);
        let response = ExecResponse::from_slice(body.as_bytes()).unwrap();
        assert_eq!(response.msg, "args: -p dummy -VVV");
        assert_eq!(response.out, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_parameters_are_400() {
        let dir = TempDir::new().unwrap();
        let (addr, _handle) = start_server(build_router(config(&dir, ECHO_ARGS))).await;

        let form = reqwest::multipart::Form::new()
            .text("programmer", "dummy")
            .text("action", "flash");
        assert_eq!(post_form(addr, form).await, (400, "Invalid value for ACTION.".to_string()));

        let form = reqwest::multipart::Form::new()
            .text("programmer", "dummy")
            .text("action", "write");
        assert_eq!(
            post_form(addr, form).await,
            (400, "Invalid Parameter. Action=WRITE requires an input file.".to_string())
        );

        let form = reqwest::multipart::Form::new()
            .text("programmer", "dummy")
            .text("action", "erase")
            .part(
                "file-upload",
                reqwest::multipart::Part::bytes(vec![0xff; 16]).file_name("a.bin"),
            );
        assert_eq!(
            post_form(addr, form).await,
            (400, "Invalid Parameter. Action=ERASE cannot use an input file.".to_string())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_file_part_is_no_file() {
        let dir = TempDir::new().unwrap();
        let (addr, _handle) = start_server(build_router(config(&dir, ECHO_ARGS))).await;

        let form = reqwest::multipart::Form::new()
            .text("programmer", "dummy")
            .text("action", "probe")
            .part("file-upload", reqwest::multipart::Part::bytes(Vec::new()).file_name(""));
        let (status, _) = post_form(addr, form).await;
        assert_eq!(status, 200);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_failure_is_500() {
        let dir = TempDir::new().unwrap();
        let script = r#"echo "chip not found" >&2; exit 1"#;
        let (addr, _handle) = start_server(build_router(config(&dir, script))).await;

        let form = reqwest::multipart::Form::new()
            .text("programmer", "dummy")
            .text("action", "probe");
        assert_eq!(post_form(addr, form).await, (500, "chip not found".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_stages_upload() {
        let dir = TempDir::new().unwrap();
        let script = r#"shift 2; [ "$1" = "-w" ] && cat "$2""#;
        let cfg = config(&dir, script);
        let input_dir = cfg.input_dir.clone();
        let (addr, _handle) = start_server(build_router(cfg)).await;

        let form = reqwest::multipart::Form::new()
            .text("programmer", "dummy")
            .text("action", "write")
            .text("force", "on")
            .part(
                "file-upload",
                reqwest::multipart::Part::bytes(b"IMAGE".to_vec()).file_name("fw.bin"),
            );
        let (status, body) = post_form(addr, form).await;
        assert_eq!(status, 200);
        assert_eq!(ExecResponse::from_slice(body.as_bytes()).unwrap().msg, "IMAGE");

        // Staged image is removed once the operation completes
        assert_eq!(std::fs::read_dir(input_dir).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_console_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let (addr, _handle) = start_server(build_router(config(&dir, DUMP_CHIP))).await;
        let transport = HttpTransport::new(&format!("http://{}/", addr)).unwrap();

        let mut console = Console::new();
        console.form.set_action(Action::Read);
        console.form.set_programmer("dummy:emulate=M25P10.RES");
        console.form.set_file(FileUpload::new("", Vec::<u8>::new()));

        let (action, request) = console.begin_submit();
        let outcome = submit(&transport, &request).await;
        let artifact = match &outcome {
            OperationResult::Success {
                message,
                artifact_url: Some(url),
            } => {
                assert_eq!(message, "Reading flash... done.");
                assert!(url.starts_with(OUTPUTS_PREFIX));
                url.clone()
            }
            other => panic!("unexpected outcome: {:?}", other),
        };

        let id = console.apply(action, outcome);
        let notification = console.log.get(id).unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.link.as_deref(), Some(artifact.as_str()));

        assert_eq!(transport.download(&artifact).await.unwrap(), b"DUMP");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_console_failure_notification() {
        let dir = TempDir::new().unwrap();
        let script = r#"echo "chip not found" >&2; exit 1"#;
        let (addr, _handle) = start_server(build_router(config(&dir, script))).await;
        let transport = HttpTransport::new(&format!("http://{}", addr)).unwrap();

        let mut console = Console::new();
        console.form.set_programmer("dummy");
        let (action, request) = console.begin_submit();
        let id = console.apply(action, submit(&transport, &request).await);

        let notification = console.log.get(id).unwrap();
        assert_eq!(notification.kind, NotificationKind::Failure);
        assert_eq!(notification.status_code, Some(500));
        assert_eq!(notification.message, "chip not found");
        assert!(notification.link.is_none());
    }

    #[tokio::test]
    async fn test_missing_tool_is_500() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir, ECHO_ARGS);
        cfg.flashrom = dir.path().join("no-such-flashrom");
        cfg.flashrom_args.clear();
        let (addr, _handle) = start_server(build_router(cfg)).await;

        let form = reqwest::multipart::Form::new()
            .text("programmer", "dummy")
            .text("action", "probe");
        let (status, body) = post_form(addr, form).await;
        assert_eq!(status, 500);
        assert!(body.starts_with("Unable to execute"), "{body}");
        assert!(body.contains("no-such-flashrom"), "{body}");
    }
}
