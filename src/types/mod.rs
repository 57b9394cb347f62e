//! 型定義モジュール
//!
//! クレート全体で使用される共通的な型定義を管理します。
//! - エラー型: トランスポート層とリポジトリ層のエラー表現
//! - 設定型: バックエンドAPIへの接続設定

pub mod config;
pub mod error;

// 便利な再エクスポート
pub use config::{ApiConfig, ConfigError, ConfigResult};
pub use error::{BoxError, HttpError, HttpResult, RepositoryError, RepositoryResult};
