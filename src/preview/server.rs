//! HTTP side of the preview: static files, client script and reload socket

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::{PipelineError, PipelineResult};

use super::registry::{ClientRegistry, ReloadMessage};

pub const RELOAD_SCRIPT_PATH: &str = "/__pagewright/reload.js";
pub const RELOAD_SOCKET_PATH: &str = "/__pagewright/ws";

const CLIENT_JS: &str = include_str!("reload.js");

#[derive(Clone)]
struct PreviewState {
    root: Arc<PathBuf>,
    registry: ClientRegistry,
}

/// Build the preview router for `root`
pub fn router(root: PathBuf, registry: ClientRegistry) -> Router {
    let state = PreviewState {
        root: Arc::new(root),
        registry,
    };
    Router::new()
        .route(RELOAD_SCRIPT_PATH, get(reload_script))
        .route(RELOAD_SOCKET_PATH, get(reload_socket))
        .fallback(serve_file)
        .with_state(state)
}

/// A bound preview server; runs until the process exits
pub struct PreviewServer {
    listener: TcpListener,
    router: Router,
    port: u16,
}

impl PreviewServer {
    pub async fn bind(root: PathBuf, port: u16, registry: ClientRegistry) -> PipelineResult<Self> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| PipelineError::Serve { port, source })?;
        Ok(Self {
            listener,
            router: router(root, registry),
            port,
        })
    }

    pub fn local_addr(&self) -> PipelineResult<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|source| PipelineError::Serve {
                port: self.port,
                source,
            })
    }

    pub async fn run(self) -> PipelineResult<()> {
        let port = self.port;
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!("Preview running at http://localhost:{}", addr.port());
        }
        axum::serve(self.listener, self.router)
            .await
            .map_err(|source| PipelineError::Serve { port, source })
    }
}

async fn reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        CLIENT_JS,
    )
}

async fn reload_socket(ws: WebSocketUpgrade, State(state): State<PreviewState>) -> Response {
    let rx = state.registry.subscribe();
    ws.on_upgrade(move |socket| client_session(socket, rx))
}

async fn client_session(mut socket: WebSocket, mut rx: broadcast::Receiver<ReloadMessage>) {
    tracing::debug!("preview client connected");
    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(message) = outgoing(received) else {
                    break;
                };
                if socket.send(Message::Text(message.to_json().into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("preview client disconnected");
}

/// The message to forward for one receive; `None` ends the session
fn outgoing(received: Result<ReloadMessage, RecvError>) -> Option<ReloadMessage> {
    match received {
        Ok(message) => Some(message),
        // missed messages: a full reload covers all of them
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "preview client lagged");
            Some(ReloadMessage::Reload)
        }
        Err(RecvError::Closed) => None,
    }
}

async fn serve_file(State(state): State<PreviewState>, req: Request) -> Response {
    if let Some(page) = html_target(&state.root, req.uri().path()) {
        match tokio::fs::read_to_string(&page).await {
            Ok(html) => return Html(inject_client(&html)).into_response(),
            Err(e) => tracing::warn!(page = %page.display(), error = %e, "serving page without reload client"),
        }
    }

    match ServeDir::new(state.root.as_path()).oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Resolve a request path to an HTML file under `root`, if it is one
fn html_target(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(uri_path).ok()?;
    let relative = decoded.trim_start_matches('/');
    if relative.split(['/', '\\']).any(|segment| segment == "..") {
        return None;
    }

    let mut path = root.join(relative);
    if relative.is_empty() || decoded.ends_with('/') {
        path = path.join("index.html");
    }

    let is_html = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    (is_html && path.is_file()).then_some(path)
}

/// Add the reload client script before `</body>`, or at the end
pub fn inject_client(html: &str) -> String {
    let tag = format!(r#"<script src="{}" async></script>"#, RELOAD_SCRIPT_PATH);
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..at]);
            out.push_str(&tag);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{}{}", html, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::ReloadSink;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use futures::StreamExt;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::net::TcpStream;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    fn site() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("index.html"),
            "<html><body><h1>Resume</h1></body></html>",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/resume.css"), "body{color:red}").unwrap();
        dir
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[test]
    fn inject_before_body_close() {
        let html = inject_client("<html><BODY>x</BODY></html>");
        assert_eq!(
            html,
            r#"<html><BODY>x<script src="/__pagewright/reload.js" async></script></BODY></html>"#
        );
    }

    #[test]
    fn inject_appends_without_body() {
        let html = inject_client("<p>fragment</p>");
        assert!(html.starts_with("<p>fragment</p><script"));
    }

    #[test]
    fn html_target_resolves_directories() {
        let dir = site();
        assert_eq!(
            html_target(dir.path(), "/"),
            Some(dir.path().join("index.html"))
        );
        assert_eq!(
            html_target(dir.path(), "/index.html"),
            Some(dir.path().join("index.html"))
        );
        assert_eq!(html_target(dir.path(), "/css/resume.css"), None);
        assert_eq!(html_target(dir.path(), "/../index.html"), None);
    }

    #[test]
    fn html_target_decodes_percent_escapes() {
        let dir = site();
        fs::write(dir.path().join("my page.html"), "<body></body>").unwrap();

        assert_eq!(
            html_target(dir.path(), "/my%20page.html"),
            Some(dir.path().join("my page.html"))
        );
        assert_eq!(html_target(dir.path(), "/%2e%2e/index.html"), None);
        assert_eq!(html_target(dir.path(), "/css%2f..%2f..%2findex.html"), None);
        assert_eq!(html_target(dir.path(), "/%ff.html"), None);
    }

    #[tokio::test]
    async fn serves_pages_with_client() {
        let dir = site();
        let app = router(dir.path().to_path_buf(), ClientRegistry::new());

        let (status, body) = get_body(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Resume</h1>"));
        assert!(body.contains(RELOAD_SCRIPT_PATH));
    }

    #[tokio::test]
    async fn serves_escaped_page_names_with_client() {
        let dir = site();
        fs::write(
            dir.path().join("my page.html"),
            "<html><body><h1>Projects</h1></body></html>",
        )
        .unwrap();
        let app = router(dir.path().to_path_buf(), ClientRegistry::new());

        let (status, body) = get_body(app, "/my%20page.html").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Projects</h1>"));
        assert!(body.contains(RELOAD_SCRIPT_PATH));
    }

    #[tokio::test]
    async fn serves_assets_untouched() {
        let dir = site();
        let app = router(dir.path().to_path_buf(), ClientRegistry::new());

        let (status, body) = get_body(app, "/css/resume.css").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body{color:red}");
    }

    #[tokio::test]
    async fn missing_files_are_404() {
        let dir = site();
        let app = router(dir.path().to_path_buf(), ClientRegistry::new());

        let (status, _) = get_body(app, "/img/profile.jpg").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_client_script() {
        let dir = site();
        let app = router(dir.path().to_path_buf(), ClientRegistry::new());

        let (status, body) = get_body(app, RELOAD_SCRIPT_PATH).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(RELOAD_SOCKET_PATH));
    }

    async fn serve(registry: ClientRegistry) -> (tempfile::TempDir, SocketAddr) {
        let dir = site();
        let server = PreviewServer::bind(dir.path().to_path_buf(), 0, registry)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        (dir, addr)
    }

    async fn connect(addr: SocketAddr) -> Client {
        let url = format!("ws://{}{}", addr, RELOAD_SOCKET_PATH);
        let (client, _) = connect_async(url).await.unwrap();
        client
    }

    async fn next_text(client: &mut Client) -> String {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("no message within 5s")
            .unwrap()
            .unwrap();
        message.to_text().unwrap().to_string()
    }

    async fn wait_for_clients(registry: &ClientRegistry, count: usize) {
        for _ in 0..200 {
            if registry.client_count() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} clients, have {}",
            count,
            registry.client_count()
        );
    }

    #[tokio::test]
    async fn socket_clients_receive_reload_and_inject() {
        let registry = ClientRegistry::new();
        let (_dir, addr) = serve(registry.clone()).await;
        let mut client = connect(addr).await;
        wait_for_clients(&registry, 1).await;

        registry.broadcast_reload();
        registry.inject_asset(Path::new("css/x.min.css"));

        assert_eq!(next_text(&mut client).await, r#"{"type":"reload"}"#);
        assert_eq!(
            next_text(&mut client).await,
            r#"{"type":"inject","path":"/css/x.min.css"}"#
        );
    }

    #[tokio::test]
    async fn every_socket_client_gets_the_signal() {
        let registry = ClientRegistry::new();
        let (_dir, addr) = serve(registry.clone()).await;
        let mut first = connect(addr).await;
        let mut second = connect(addr).await;
        wait_for_clients(&registry, 2).await;

        registry.broadcast_reload();

        assert_eq!(next_text(&mut first).await, r#"{"type":"reload"}"#);
        assert_eq!(next_text(&mut second).await, r#"{"type":"reload"}"#);
    }

    #[tokio::test]
    async fn closing_the_socket_unregisters_the_client() {
        let registry = ClientRegistry::new();
        let (_dir, addr) = serve(registry.clone()).await;
        let mut client = connect(addr).await;
        wait_for_clients(&registry, 1).await;

        client.close(None).await.unwrap();

        wait_for_clients(&registry, 0).await;
    }

    #[tokio::test]
    async fn lagging_client_gets_a_full_reload() {
        let registry = ClientRegistry::new();
        let mut rx = registry.subscribe();
        for i in 0..100 {
            registry.inject_asset(Path::new(&format!("css/{i}.min.css")));
        }

        assert_eq!(outgoing(rx.recv().await), Some(ReloadMessage::Reload));
        assert_eq!(outgoing(Err(RecvError::Closed)), None);
    }

    #[tokio::test]
    async fn bind_on_ephemeral_port() {
        let dir = site();
        let server = PreviewServer::bind(dir.path().to_path_buf(), 0, ClientRegistry::new())
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }
}
