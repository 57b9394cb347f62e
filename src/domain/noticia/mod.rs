pub mod model;
pub mod repository;
pub mod search;

// 公開APIの再エクスポート

// model.rsから
pub use model::{
    CreateNoticiaDto, ListNoticiasParams, Noticia, NoticiaId, NoticiaPage, UpdateNoticiaDto,
};

// repository.rsから
pub use repository::{NoticiaRepository, COLLECTION};

// search.rsから
pub use search::{matches_query, paginate, search_noticias};
