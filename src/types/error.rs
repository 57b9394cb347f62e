use thiserror::Error;

/// 下位エラーを保持するためのボックス型
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// HTTPトランスポート層のエラー型
/// 接続拒否やタイムアウトなど、レスポンスを受け取れなかった場合のみを表す
#[derive(Error, Debug)]
pub enum HttpError {
    /// 通信そのものに失敗した
    #[error("通信エラー: {method} {url} - {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: BoxError,
    },
}

impl HttpError {
    /// 通信エラーを作成
    pub fn transport<M, U, E>(method: M, url: U, source: E) -> Self
    where
        M: Into<String>,
        U: Into<String>,
        E: Into<BoxError>,
    {
        Self::Transport {
            method: method.into(),
            url: url.into(),
            source: source.into(),
        }
    }
}

/// HTTPエラーのResult型エイリアス
pub type HttpResult<T> = std::result::Result<T, HttpError>;

/// ノティシアリポジトリのエラー型
/// トランスポートのエラーはそのまま包んで呼び出し元へ返す
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// トランスポート層のエラー
    #[error(transparent)]
    Http(#[from] HttpError),

    /// 指定したレコードが存在しない（404）
    #[error("レコードが見つかりません: {url}")]
    NotFound { url: String },

    /// 404以外の非2xxステータス
    #[error("HTTPステータスエラー: {method} {url} - {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// レスポンスボディのJSON解析に失敗
    #[error("レスポンス解析エラー: {context} - {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// リクエストボディのシリアライズに失敗
    #[error("リクエスト生成エラー: {context} - {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// リクエストURLを組み立てられない
    #[error("URLが不正です: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl RepositoryError {
    /// 404エラーを作成
    pub fn not_found<U: Into<String>>(url: U) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// ステータスエラーを作成
    pub fn status<M: Into<String>, U: Into<String>>(
        method: M,
        url: U,
        status: u16,
        body: String,
    ) -> Self {
        Self::Status {
            method: method.into(),
            url: url.into(),
            status,
            body,
        }
    }

    /// JSON解析エラーを作成
    pub fn decode<C: Into<String>>(context: C, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// JSON生成エラーを作成
    pub fn encode<C: Into<String>>(context: C, source: serde_json::Error) -> Self {
        Self::Encode {
            context: context.into(),
            source,
        }
    }

    /// URLエラーを作成
    pub fn invalid_url<U: Into<String>, R: Into<String>>(url: U, reason: R) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// レコード不在によるエラーかどうか
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// リポジトリ操作のResult型エイリアス
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;
