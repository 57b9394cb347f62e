use crate::infra::parser::{format_date, iso8601};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// サーバーが管理するため、呼び出し側から送らせないフィールド
const SERVER_MANAGED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;

/// ニュースのID
///
/// json-server 0.xは数値、1.xは`"e3b1"`のような文字列を採番する。
/// 受け取った形式のまま保持し、そのまま`/noticias/{id}`に埋め込む。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoticiaId {
    Number(u64),
    Text(String),
}

// ニュース記事エンティティ（json-serverのレコードと一致）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Noticia {
    pub id: NoticiaId,
    pub titulo: String,
    pub descricao: String,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    /// 上記以外にレコードが持つフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// 作成時に呼び出し側が指定する内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateNoticiaDto {
    pub titulo: String,
    pub descricao: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// 部分更新で呼び出し側が指定する内容（指定したフィールドのみ送信）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateNoticiaDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 一覧取得の条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNoticiasParams {
    pub page: u32,
    pub per_page: u32,
    /// タイトル・説明文の検索語
    pub q: Option<String>,
}

/// 一覧取得の結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticiaPage {
    pub data: Vec<Noticia>,
    /// ページ分割前の総件数
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl CreateNoticiaDto {
    pub fn new(titulo: impl Into<String>, descricao: impl Into<String>) -> Self {
        Self {
            titulo: titulo.into(),
            descricao: descricao.into(),
            extra: Map::new(),
        }
    }

    /// 追加フィールドを設定
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// 送信用のJSONボディを作る
    ///
    /// `createdAt`と`updatedAt`は両方とも`now`になる。
    pub fn to_payload(&self, now: DateTime<Utc>) -> serde_json::Result<Value> {
        let mut body = into_object(serde_json::to_value(self)?);
        strip_server_managed(&mut body);
        let timestamp = serde_json::to_value(format_date(&now))?;
        body.insert("createdAt".to_string(), timestamp.clone());
        body.insert("updatedAt".to_string(), timestamp);
        Ok(Value::Object(body))
    }
}

impl UpdateNoticiaDto {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_titulo(mut self, titulo: impl Into<String>) -> Self {
        self.titulo = Some(titulo.into());
        self
    }

    pub fn with_descricao(mut self, descricao: impl Into<String>) -> Self {
        self.descricao = Some(descricao.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// 送信用のJSONボディを作る（`updatedAt`のみ`now`で上書き）
    pub fn to_payload(&self, now: DateTime<Utc>) -> serde_json::Result<Value> {
        let mut body = into_object(serde_json::to_value(self)?);
        strip_server_managed(&mut body);
        body.insert(
            "updatedAt".to_string(),
            serde_json::to_value(format_date(&now))?,
        );
        Ok(Value::Object(body))
    }
}

impl ListNoticiasParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// 1未満のページ番号は1として扱う
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    /// 1未満の件数は1として扱う
    pub fn effective_per_page(&self) -> u32 {
        self.per_page.max(1)
    }

    /// 空白以外を含む検索語があれば返す（検索語自体は加工しない）
    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.trim().is_empty())
    }
}

impl Default for ListNoticiasParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            q: None,
        }
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn strip_server_managed(body: &mut Map<String, Value>) {
    for field in SERVER_MANAGED_FIELDS {
        body.remove(field);
    }
}

impl fmt::Display for NoticiaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticiaId::Number(id) => write!(f, "{}", id),
            NoticiaId::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for NoticiaId {
    fn from(id: u64) -> Self {
        NoticiaId::Number(id)
    }
}

impl From<String> for NoticiaId {
    fn from(id: String) -> Self {
        NoticiaId::Text(id)
    }
}

impl From<&str> for NoticiaId {
    fn from(id: &str) -> Self {
        NoticiaId::Text(id.to_string())
    }
}

/// コマンドライン等の文字列から解釈する
///
/// 正規の10進表記（先頭ゼロなし）なら数値、それ以外は文字列IDとして扱う。
impl FromStr for NoticiaId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u64>() {
            Ok(id) if id.to_string() == s => Ok(NoticiaId::Number(id)),
            _ => Ok(NoticiaId::Text(s.to_string())),
        }
    }
}
