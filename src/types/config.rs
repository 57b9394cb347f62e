use reqwest::Url;
use std::env;
use thiserror::Error;

/// APIのベースURLを指定する環境変数
pub const API_URL_VAR: &str = "NOTICIAS_API_URL";
/// リクエストタイムアウト（秒）を指定する環境変数
pub const API_TIMEOUT_VAR: &str = "NOTICIAS_API_TIMEOUT_SECS";

/// json-serverのデフォルトの待ち受け先
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 設定関連のエラー型
/// 環境変数や設定値の検証など設定に関するエラーを定義
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 環境変数が見つからない
    #[error("環境変数が見つかりません: {name}")]
    MissingEnvironmentVariable { name: String },

    /// 設定値が不正
    #[error("設定値が不正です: {reason}")]
    InvalidValue { reason: String },
}

impl ConfigError {
    /// 環境変数不足エラーを作成
    pub fn missing_env_var<N: Into<String>>(name: N) -> Self {
        Self::MissingEnvironmentVariable { name: name.into() }
    }

    /// 不正な設定値エラーを作成
    pub fn invalid_value<R: Into<String>>(reason: R) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }
}

/// 設定エラーのResult型エイリアス
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// バックエンドAPIへの接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// 末尾が必ず `/` で終わるベースURL
    pub base_url: Url,
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// ベースURL文字列から設定を作成する
    pub fn new(base_url: &str, timeout_secs: u64) -> ConfigResult<Self> {
        if timeout_secs == 0 {
            return Err(ConfigError::invalid_value(format!(
                "{}は1以上である必要があります",
                API_TIMEOUT_VAR
            )));
        }
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout_secs,
        })
    }

    /// 環境変数から設定を読み込む
    ///
    /// 未設定の項目はデフォルト値を使う。`.env` の読み込みは呼び出し側で行う。
    pub fn from_env() -> ConfigResult<Self> {
        let base_url = env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout_secs = match env::var(API_TIMEOUT_VAR) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::invalid_value(format!("{}が数値ではありません: {}", API_TIMEOUT_VAR, raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(&base_url, timeout_secs)
    }

    /// 必須の環境変数を取得する
    pub fn require_env(name: &str) -> ConfigResult<String> {
        env::var(name).map_err(|_| ConfigError::missing_env_var(name))
    }
}

fn parse_base_url(raw: &str) -> ConfigResult<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::invalid_value(format!("URLを解析できません: {} ({})", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid_value(format!(
            "http(s)のURLを指定してください: {}",
            raw
        )));
    }
    // 末尾スラッシュがないとjoin時に最後のセグメントが置き換わる
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
