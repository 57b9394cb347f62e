use crate::types::{HttpError, HttpResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// HTTPメソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// トランスポートから受け取ったレスポンス
///
/// ステータスの成否は判定しない。非2xxの扱いは呼び出し側が決める。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// ヘッダー名は小文字に正規化して保持する
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// JSONボディのレスポンスを作成
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string()).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// ヘッダー値を大文字小文字を区別せずに取得
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTPクライアントの抽象化トレイト
///
/// 実際のHTTP通信とモック実装の両方を統一的に扱うためのインターフェースです。
/// 実装は同時に複数のリクエストを受け付けられる必要があります。
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> HttpResult<HttpResponse>;

    /// JSONボディを送信する
    async fn post(&self, url: &str, body: &Value) -> HttpResult<HttpResponse>;

    /// JSONボディで部分更新する
    async fn patch(&self, url: &str, body: &Value) -> HttpResult<HttpResponse>;

    async fn delete(&self, url: &str) -> HttpResult<HttpResponse>;
}

/// `reqwest` を使用した本番用のHTTPクライアント実装
pub struct ReqwestHttpClient {
    client: Client,
    timeout: Duration,
}

impl ReqwestHttpClient {
    /// 新しいHTTPクライアントを作成（タイムアウト30秒）
    pub fn new() -> Self {
        Self::with_timeout(30)
    }

    /// タイムアウト秒数を指定してHTTPクライアントを作成
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        request: RequestBuilder,
    ) -> HttpResult<HttpResponse> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| HttpError::transport(method.to_string(), url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::transport(method.to_string(), url, e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> HttpResult<HttpResponse> {
        self.send(HttpMethod::Get, url, self.client.get(url)).await
    }

    async fn post(&self, url: &str, body: &Value) -> HttpResult<HttpResponse> {
        self.send(HttpMethod::Post, url, self.client.post(url).json(body))
            .await
    }

    async fn patch(&self, url: &str, body: &Value) -> HttpResult<HttpResponse> {
        self.send(HttpMethod::Patch, url, self.client.patch(url).json(body))
            .await
    }

    async fn delete(&self, url: &str) -> HttpResult<HttpResponse> {
        self.send(HttpMethod::Delete, url, self.client.delete(url))
            .await
    }
}

/// モックが受け取ったリクエストの記録
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

enum MockReply {
    Response(HttpResponse),
    Error(String),
}

/// テスト用のモックHTTPクライアント
///
/// この実装はテスト時にDIされ、実際のHTTPリクエストを行わずに
/// 登録順にレスポンスやエラーを返します。受け取ったリクエストは記録されます。
#[derive(Default)]
pub struct MockHttpClient {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次に返すレスポンスを追加
    pub fn with_response(self, response: HttpResponse) -> Self {
        lock(&self.replies).push_back(MockReply::Response(response));
        self
    }

    /// 次に返す通信エラーを追加
    pub fn with_error(self, message: &str) -> Self {
        lock(&self.replies).push_back(MockReply::Error(message.to_string()));
        self
    }

    /// これまでに受け取ったリクエスト
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    fn reply(&self, method: HttpMethod, url: &str, body: Option<&Value>) -> HttpResult<HttpResponse> {
        lock(&self.requests).push(RecordedRequest {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });

        match lock(&self.replies).pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(message)) => Err(HttpError::transport(
                method.to_string(),
                url,
                format!("モックHTTPエラー: {}", message),
            )),
            None => Err(HttpError::transport(
                method.to_string(),
                url,
                "モックレスポンスが登録されていません",
            )),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str) -> HttpResult<HttpResponse> {
        self.reply(HttpMethod::Get, url, None)
    }

    async fn post(&self, url: &str, body: &Value) -> HttpResult<HttpResponse> {
        self.reply(HttpMethod::Post, url, Some(body))
    }

    async fn patch(&self, url: &str, body: &Value) -> HttpResult<HttpResponse> {
        self.reply(HttpMethod::Patch, url, Some(body))
    }

    async fn delete(&self, url: &str) -> HttpResult<HttpResponse> {
        self.reply(HttpMethod::Delete, url, None)
    }
}
