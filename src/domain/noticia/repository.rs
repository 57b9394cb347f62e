use super::model::{
    CreateNoticiaDto, ListNoticiasParams, Noticia, NoticiaId, NoticiaPage, UpdateNoticiaDto,
};
use super::search::search_noticias;
use crate::infra::api::http::{HttpClient, HttpMethod, HttpResponse};
use crate::infra::clock::{Clock, SystemClock};
use crate::infra::parser::{parse_total_count, TOTAL_COUNT_HEADER};
use crate::types::{ApiConfig, RepositoryError, RepositoryResult};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// json-server上のコレクション名
pub const COLLECTION: &str = "noticias";
/// 一覧の並び順に使うフィールド
const SORT_FIELD: &str = "createdAt";

/// `noticias`コレクションへのCRUD操作
///
/// HTTPクライアントと時刻はDIされる。各操作は1回のリクエストで完結し、
/// 内部状態を持たないため複数タスクから同時に呼び出してよい。
/// 失敗はリトライせずにそのまま呼び出し元へ返す。
pub struct NoticiaRepository<H, C = SystemClock> {
    client: H,
    clock: C,
    base_url: Url,
}

impl<H: HttpClient> NoticiaRepository<H, SystemClock> {
    /// システム時刻を使うリポジトリを作成
    pub fn new(client: H, config: &ApiConfig) -> Self {
        Self::with_clock(client, SystemClock, config.base_url.clone())
    }
}

impl<H: HttpClient, C: Clock> NoticiaRepository<H, C> {
    /// クロックを指定してリポジトリを作成
    ///
    /// `base_url`は末尾が`/`であること（`ApiConfig`経由なら保証される）。
    pub fn with_clock(client: H, clock: C, base_url: Url) -> Self {
        Self {
            client,
            clock,
            base_url,
        }
    }

    pub fn client(&self) -> &H {
        &self.client
    }

    /// ニュースの一覧を取得する
    ///
    /// 検索語がある場合は全件を取得してクライアント側で絞り込み・ページ分割する。
    /// 検索語がない場合はサーバー側でページ分割し、総件数は`X-Total-Count`から読む。
    pub async fn list(&self, params: &ListNoticiasParams) -> RepositoryResult<NoticiaPage> {
        let page = params.effective_page();
        let per_page = params.effective_per_page();

        if let Some(query) = params.search_term() {
            let mut url = self.collection_url()?;
            url.query_pairs_mut()
                .append_pair("_sort", SORT_FIELD)
                .append_pair("_order", "desc");

            let response = self.client.get(url.as_str()).await?;
            let response = check_status(HttpMethod::Get, &url, response)?;
            let all: Vec<Noticia> = decode("ニュース一覧", &response)?;
            let (data, total) = search_noticias(all, query, page, per_page);
            debug!(query, total, page, per_page, "クライアント側で検索しました");

            return Ok(NoticiaPage {
                data,
                total,
                page,
                per_page,
            });
        }

        let mut url = self.collection_url()?;
        url.query_pairs_mut()
            .append_pair("_page", &page.to_string())
            .append_pair("_limit", &per_page.to_string())
            .append_pair("_sort", SORT_FIELD)
            .append_pair("_order", "desc");

        let response = self.client.get(url.as_str()).await?;
        let response = check_status(HttpMethod::Get, &url, response)?;
        let data: Vec<Noticia> = decode("ニュース一覧", &response)?;
        let total = read_total_count(&response, &url);

        Ok(NoticiaPage {
            data,
            total,
            page,
            per_page,
        })
    }

    /// IDを指定してニュースを取得する
    pub async fn get_by_id(&self, id: &NoticiaId) -> RepositoryResult<Noticia> {
        let url = self.item_url(id)?;
        let response = self.client.get(url.as_str()).await?;
        let response = check_status(HttpMethod::Get, &url, response)?;
        decode("ニュース", &response)
    }

    /// ニュースを作成する
    ///
    /// `createdAt`と`updatedAt`は送信前に現在時刻で埋める。IDはサーバーが採番する。
    pub async fn create(&self, data: &CreateNoticiaDto) -> RepositoryResult<Noticia> {
        let url = self.collection_url()?;
        let body = data
            .to_payload(self.clock.now())
            .map_err(|e| RepositoryError::encode("ニュース作成リクエスト", e))?;

        let response = self.client.post(url.as_str(), &body).await?;
        let response = check_status(HttpMethod::Post, &url, response)?;
        decode("作成したニュース", &response)
    }

    /// ニュースを部分更新する（`updatedAt`は現在時刻で上書き）
    pub async fn update(&self, id: &NoticiaId, data: &UpdateNoticiaDto) -> RepositoryResult<Noticia> {
        let url = self.item_url(id)?;
        let body = data
            .to_payload(self.clock.now())
            .map_err(|e| RepositoryError::encode("ニュース更新リクエスト", e))?;

        let response = self.client.patch(url.as_str(), &body).await?;
        let response = check_status(HttpMethod::Patch, &url, response)?;
        decode("更新したニュース", &response)
    }

    /// ニュースを削除する
    pub async fn delete_by_id(&self, id: &NoticiaId) -> RepositoryResult<()> {
        let url = self.item_url(id)?;
        let response = self.client.delete(url.as_str()).await?;
        check_status(HttpMethod::Delete, &url, response)?;
        Ok(())
    }

    fn collection_url(&self) -> RepositoryResult<Url> {
        self.join(COLLECTION)
    }

    fn item_url(&self, id: &NoticiaId) -> RepositoryResult<Url> {
        let mut url = self.collection_url()?;
        let raw = format!("{}/{}", url, id);
        // 文字列IDに`/`や`?`が含まれてもパスの1セグメントとして扱う
        url.path_segments_mut()
            .map_err(|_| RepositoryError::invalid_url(raw, "パスを持てないURLです"))?
            .push(&id.to_string());
        Ok(url)
    }

    fn join(&self, path: &str) -> RepositoryResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RepositoryError::invalid_url(format!("{}{}", self.base_url, path), e.to_string()))
    }
}

/// 非2xxのレスポンスをエラーに変換する
fn check_status(method: HttpMethod, url: &Url, response: HttpResponse) -> RepositoryResult<HttpResponse> {
    debug!(%method, url = %url, status = response.status, "レスポンスを受信");

    if response.status == 404 {
        return Err(RepositoryError::not_found(url.as_str()));
    }
    if !response.is_success() {
        return Err(RepositoryError::status(
            method.to_string(),
            url.as_str(),
            response.status,
            response.body,
        ));
    }
    Ok(response)
}

/// 件数ヘッダーを読む。ない・不正な場合は0件とみなす
fn read_total_count(response: &HttpResponse, url: &Url) -> u64 {
    let raw = response.header(TOTAL_COUNT_HEADER);
    match parse_total_count(raw) {
        Some(total) => total,
        None => {
            warn!(url = %url, header = ?raw, "X-Total-Countが読めないため総件数を0とします");
            0
        }
    }
}

fn decode<T: DeserializeOwned>(context: &str, response: &HttpResponse) -> RepositoryResult<T> {
    serde_json::from_str(&response.body).map_err(|e| RepositoryError::decode(context, e))
}
