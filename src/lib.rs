//! json-server上の`noticias`コレクションを操作するデータアクセス層
//!
//! - `domain::noticia`: モデル、検索、リポジトリ
//! - `infra`: HTTPクライアント・時刻の抽象化とワイヤ形式の解析
//! - `types`: エラー型と接続設定

pub mod domain;
pub mod infra;
pub mod types;

pub use domain::noticia::{
    CreateNoticiaDto, ListNoticiasParams, Noticia, NoticiaId, NoticiaPage, NoticiaRepository,
    UpdateNoticiaDto,
};
pub use types::{ApiConfig, RepositoryError, RepositoryResult};
