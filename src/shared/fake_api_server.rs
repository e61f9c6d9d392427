//! テスト用のフェイクAPIサーバー
//!
//! 127.0.0.1の空きポートでHTTPを受け付け、受信したリクエストを記録して
//! テストが指定したレスポンスを返す。

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpStream;

/// 受信したリクエスト
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync>;

/// フェイクAPIサーバー
pub struct FakeApiServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeApiServer {
    /// サーバーを開始する
    ///
    /// # 引数
    /// * `responder` - リクエストごとに (ステータス, JSONボディ) を返す関数
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Responder = Arc::new(responder);

        log::debug!("フェイクAPIサーバーを開始しました: http://{addr}");

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let recorded = Arc::clone(&recorded);
                        let responder = Arc::clone(&responder);
                        tokio::spawn(async move {
                            handle_connection(stream, recorded, responder).await;
                        });
                    }
                    Err(e) => {
                        log::error!("接続受け入れエラー: {e}");
                        break;
                    }
                }
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// TCP接続を処理する
async fn handle_connection(
    stream: TcpStream,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Responder,
) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req| {
        handle_request(req, Arc::clone(&recorded), Arc::clone(&responder))
    });

    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
        log::error!("HTTP接続処理エラー: {err}");
    }
}

/// HTTPリクエストを記録してレスポンスを返す
async fn handle_request(
    req: Request<Incoming>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Responder,
) -> Result<Response<String>, Infallible> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let authorization = header("authorization");
    let content_type = header("content-type");
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(e) => {
            log::error!("リクエストボディの読み取りに失敗: {e}");
            Vec::new()
        }
    };

    let request = RecordedRequest {
        method,
        path,
        authorization,
        content_type,
        body,
    };
    log::debug!(
        "フェイクAPIサーバーがリクエストを受信: {} {}",
        request.method,
        request.path
    );

    let (status, body) = responder(&request);
    recorded.lock().unwrap().push(request);

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body)
        .unwrap())
}
