use super::model::Noticia;

/// タイトルまたは説明文に検索語が含まれるか（大文字小文字は区別しない）
pub fn matches_query(noticia: &Noticia, query: &str) -> bool {
    let needle = query.to_lowercase();
    noticia.titulo.to_lowercase().contains(&needle)
        || noticia.descricao.to_lowercase().contains(&needle)
}

/// `page`ページ目（1始まり）の`per_page`件を切り出す
///
/// 範囲外のページは空になる。
pub fn paginate<T>(items: Vec<T>, page: u32, per_page: u32) -> Vec<T> {
    let offset = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
    items
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect()
}

/// 検索語で絞り込んでからページ分割する
///
/// 並び順は入力のまま保持される。戻り値の件数はページ分割前の一致件数。
pub fn search_noticias(
    noticias: Vec<Noticia>,
    query: &str,
    page: u32,
    per_page: u32,
) -> (Vec<Noticia>, u64) {
    let filtered: Vec<Noticia> = noticias
        .into_iter()
        .filter(|noticia| matches_query(noticia, query))
        .collect();
    let total = filtered.len() as u64;
    (paginate(filtered, page, per_page), total)
}
