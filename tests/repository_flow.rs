//! インメモリのjson-server互換フェイクを使ったリポジトリのフローテスト
//!
//! 作成→取得、更新→取得、削除→取得といった往復の性質を、
//! 状態を持つフェイクサーバーに対して検証します。

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use noticias::infra::api::http::{HttpClient, HttpResponse};
use noticias::infra::clock::FixedClock;
use noticias::types::HttpResult;
use noticias::{
    CreateNoticiaDto, ListNoticiasParams, NoticiaId, NoticiaRepository, UpdateNoticiaDto,
};
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const BASE: &str = "http://fake.local/";

/// json-serverの`_page`/`_limit`/`_sort`/`_order`と`X-Total-Count`を再現するフェイク
#[derive(Default)]
struct FakeJsonServer {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    records: Vec<Value>,
    next_id: u64,
}

impl FakeJsonServer {
    fn item_id(url: &Url) -> Option<u64> {
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["noticias", id] => id.parse().ok(),
            _ => None,
        }
    }

    fn not_found() -> HttpResponse {
        HttpResponse::json(404, &json!({}))
    }
}

#[async_trait]
impl HttpClient for FakeJsonServer {
    async fn get(&self, url: &str) -> HttpResult<HttpResponse> {
        let url = Url::parse(url).unwrap();
        let state = self.state.lock().unwrap();

        if let Some(id) = Self::item_id(&url) {
            return Ok(state
                .records
                .iter()
                .find(|r| r["id"] == json!(id))
                .map(|r| HttpResponse::json(200, r))
                .unwrap_or_else(Self::not_found));
        }

        let mut records = state.records.clone();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let param = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        if let Some(field) = param("_sort") {
            records.sort_by(|a, b| a[field.as_str()].as_str().cmp(&b[field.as_str()].as_str()));
            if param("_order").as_deref() == Some("desc") {
                records.reverse();
            }
        }

        let total = records.len();
        let mut response_records = records;
        if let (Some(page), Some(limit)) = (param("_page"), param("_limit")) {
            let page: usize = page.parse().unwrap();
            let limit: usize = limit.parse().unwrap();
            response_records = response_records
                .into_iter()
                .skip((page - 1) * limit)
                .take(limit)
                .collect();
        }

        Ok(HttpResponse::json(200, &Value::Array(response_records))
            .with_header("X-Total-Count", total.to_string()))
    }

    async fn post(&self, _url: &str, body: &Value) -> HttpResult<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let mut record = body.clone();
        record["id"] = json!(state.next_id);
        state.records.push(record.clone());
        Ok(HttpResponse::json(201, &record))
    }

    async fn patch(&self, url: &str, body: &Value) -> HttpResult<HttpResponse> {
        let url = Url::parse(url).unwrap();
        let id = Self::item_id(&url).map(|i| json!(i));
        let mut state = self.state.lock().unwrap();

        match state.records.iter_mut().find(|r| Some(&r["id"]) == id.as_ref()) {
            Some(record) => {
                for (key, value) in body.as_object().unwrap() {
                    record[key.as_str()] = value.clone();
                }
                Ok(HttpResponse::json(200, record))
            }
            None => Ok(Self::not_found()),
        }
    }

    async fn delete(&self, url: &str) -> HttpResult<HttpResponse> {
        let url = Url::parse(url).unwrap();
        let id = Self::item_id(&url).map(|i| json!(i));
        let mut state = self.state.lock().unwrap();

        let before = state.records.len();
        state.records.retain(|r| Some(&r["id"]) != id.as_ref());
        if state.records.len() == before {
            Ok(Self::not_found())
        } else {
            Ok(HttpResponse::json(200, &json!({})))
        }
    }
}

fn repository() -> NoticiaRepository<FakeJsonServer, FixedClock> {
    let start = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
    NoticiaRepository::with_clock(
        FakeJsonServer::default(),
        FixedClock::new(start),
        Url::parse(BASE).unwrap(),
    )
}

type SharedClockRepository = NoticiaRepository<FakeJsonServer, Arc<FixedClock>>;

/// テスト側からクロックを操作するため、リポジトリとは別に同じ開始時刻のクロックを用意する
fn repository_with_clock() -> (SharedClockRepository, Arc<FixedClock>) {
    let start = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(start));
    let repo = NoticiaRepository::with_clock(
        FakeJsonServer::default(),
        clock.clone(),
        Url::parse(BASE).unwrap(),
    );
    (repo, clock)
}

/// 1分ずつ時刻を進めながらニュースを作成する
async fn seed(
    repo: &SharedClockRepository,
    clock: &FixedClock,
    items: &[(&str, &str)],
) -> Result<Vec<NoticiaId>, anyhow::Error> {
    let mut ids = Vec::new();
    for (titulo, descricao) in items {
        let created = repo.create(&CreateNoticiaDto::new(*titulo, *descricao)).await?;
        ids.push(created.id);
        clock.advance(Duration::minutes(1));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get_round_trip() -> Result<(), anyhow::Error> {
        let repo = repository();
        let dto = CreateNoticiaDto::new("Economia cresce", "PIB sobe 2%").with_field("autor", json!("Ana"));

        let created = repo.create(&dto).await?;
        let fetched = repo.get_by_id(&created.id).await?;

        assert_eq!(fetched, created);
        assert_eq!(fetched.titulo, dto.titulo);
        assert_eq!(fetched.descricao, dto.descricao);
        assert_eq!(fetched.extra.get("autor"), Some(&json!("Ana")));
        assert_eq!(fetched.created_at, fetched.updated_at);
        println!("✅ 作成→取得の往復テスト成功: id={}", created.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() -> Result<(), anyhow::Error> {
        let (repo, clock) = repository_with_clock();
        let created = repo.create(&CreateNoticiaDto::new("Clima", "Frente fria")).await?;

        clock.advance(Duration::seconds(30));
        repo.update(&created.id, &UpdateNoticiaDto::new().with_titulo("Clima hoje"))
            .await?;
        let fetched = repo.get_by_id(&created.id).await?;

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.titulo, "Clima hoje");
        assert_eq!(fetched.descricao, created.descricao);
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.updated_at > created.updated_at, "updatedAtが増加するべき");

        clock.advance(Duration::milliseconds(1));
        let again = repo
            .update(&created.id, &UpdateNoticiaDto::new().with_descricao("Frio intenso"))
            .await?;
        assert!(again.updated_at > fetched.updated_at);
        assert_eq!(again.titulo, "Clima hoje");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() -> Result<(), anyhow::Error> {
        let repo = repository();
        let created = repo.create(&CreateNoticiaDto::new("Mercado", "Bolsa sobe")).await?;

        repo.delete_by_id(&created.id).await?;

        let err = repo.get_by_id(&created.id).await.unwrap_err();
        assert!(err.is_not_found());
        // 2回目の削除もNotFound
        assert!(repo.delete_by_id(&created.id).await.unwrap_err().is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let repo = repository();
        let err = repo
            .update(&NoticiaId::Number(77), &UpdateNoticiaDto::new().with_titulo("x"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_pages_reproduce_sorted_collection() -> Result<(), anyhow::Error> {
        let (repo, clock) = repository_with_clock();
        let titles: Vec<String> = (1..=11).map(|i| format!("Notícia {}", i)).collect();
        let items: Vec<(&str, &str)> = titles.iter().map(|t| (t.as_str(), "texto")).collect();
        let mut ids = seed(&repo, &clock, &items).await?;
        // 作成日時の降順
        ids.reverse();

        for per_page in [1, 3, 4, 10, 11, 20] {
            let mut collected = Vec::new();
            let mut page = 1;
            loop {
                let result = repo
                    .list(&ListNoticiasParams::new().page(page).per_page(per_page))
                    .await?;
                assert!(result.data.len() <= per_page as usize);
                assert_eq!(result.total, 11);
                if result.data.is_empty() {
                    break;
                }
                collected.extend(result.data.into_iter().map(|n| n.id));
                page += 1;
            }
            assert_eq!(collected, ids, "per_page={}でページを連結すると全件と一致するべき", per_page);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_search_economia_scenario() -> Result<(), anyhow::Error> {
        let (repo, clock) = repository_with_clock();
        seed(
            &repo,
            &clock,
            &[("Economia cresce", "PIB sobe"), ("Esporte nacional", "Seleção vence")],
        )
        .await?;

        for (page, per_page) in [(1, 10), (1, 1), (1, 100)] {
            let result = repo
                .list(&ListNoticiasParams::new().query("econ").page(page).per_page(per_page))
                .await?;
            assert_eq!(result.total, 1);
            assert_eq!(result.data.len(), 1);
            assert_eq!(result.data[0].titulo, "Economia cresce");
        }

        let beyond = repo
            .list(&ListNoticiasParams::new().query("econ").page(2).per_page(1))
            .await?;
        assert_eq!(beyond.total, 1);
        assert!(beyond.data.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_results_all_match() -> Result<(), anyhow::Error> {
        let (repo, clock) = repository_with_clock();
        seed(
            &repo,
            &clock,
            &[
                ("Economia cresce", "PIB"),
                ("Futebol", "Clássico termina empatado"),
                ("Mercado", "Reflexos na ECONOMIA"),
                ("Tecnologia", "Nova economia digital"),
                ("Clima", "Chuva forte"),
            ],
        )
        .await?;

        for query in ["econ", "ECONOMIA", "a", "chuva", "inexistente"] {
            let all = repo
                .list(&ListNoticiasParams::new().query(query).per_page(100))
                .await?;
            let needle = query.to_lowercase();
            for noticia in &all.data {
                assert!(
                    noticia.titulo.to_lowercase().contains(&needle)
                        || noticia.descricao.to_lowercase().contains(&needle),
                    "{}は検索語{}に一致しない",
                    noticia.titulo,
                    query
                );
            }
            assert_eq!(all.total as usize, all.data.len());

            let first_page = repo
                .list(&ListNoticiasParams::new().query(query).per_page(1))
                .await?;
            assert_eq!(first_page.total, all.total, "総件数はページに依存しない");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_operations() -> Result<(), anyhow::Error> {
        let repo = repository();
        let (dto_a, dto_b, dto_c) = (
            CreateNoticiaDto::new("A", "a"),
            CreateNoticiaDto::new("B", "b"),
            CreateNoticiaDto::new("C", "c"),
        );
        let (a, b, c) = tokio::join!(repo.create(&dto_a), repo.create(&dto_b), repo.create(&dto_c));
        let mut ids = vec![a?.id, b?.id, c?.id];
        ids.sort();
        let expected: Vec<NoticiaId> = (1..=3).map(NoticiaId::Number).collect();
        assert_eq!(ids, expected);

        let (existing, absent) = (NoticiaId::Number(1), NoticiaId::Number(99));
        let (first, missing) = tokio::join!(repo.get_by_id(&existing), repo.get_by_id(&absent));
        assert_eq!(first?.id, existing);
        assert!(missing.unwrap_err().is_not_found());
        Ok(())
    }
}
