use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use noticias::infra::api::http::ReqwestHttpClient;
use noticias::{
    ApiConfig, CreateNoticiaDto, ListNoticiasParams, NoticiaId, NoticiaRepository, UpdateNoticiaDto,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// json-serverの`noticias`コレクションを操作するCLI
#[derive(Parser, Debug)]
#[command(name = "noticias", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 一覧を取得（--qでタイトル・説明文を検索）
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
        #[arg(long)]
        q: Option<String>,
    },
    /// IDを指定して取得
    Get { id: NoticiaId },
    /// 新規作成
    Create {
        #[arg(long)]
        titulo: String,
        #[arg(long)]
        descricao: String,
    },
    /// 部分更新
    Update {
        id: NoticiaId,
        #[arg(long)]
        titulo: Option<String>,
        #[arg(long)]
        descricao: Option<String>,
    },
    /// 削除
    Delete { id: NoticiaId },
}

#[tokio::main]
async fn main() {
    // 環境変数を読み込み（.envファイルがあれば使用）
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("エラーが発生しました: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let config = ApiConfig::from_env().context("設定の読み込みに失敗")?;
    tracing::info!(base_url = %config.base_url, "APIに接続します");

    let client = ReqwestHttpClient::with_timeout(config.timeout_secs);
    let repository = NoticiaRepository::new(client, &config);

    match command {
        Command::List { page, per_page, q } => {
            let mut params = ListNoticiasParams::new().page(page).per_page(per_page);
            params.q = q;
            let result = repository.list(&params).await.context("一覧の取得に失敗")?;
            print_json(&result)
        }
        Command::Get { id } => {
            let noticia = repository
                .get_by_id(&id)
                .await
                .with_context(|| format!("ID {} の取得に失敗", id))?;
            print_json(&noticia)
        }
        Command::Create { titulo, descricao } => {
            let created = repository
                .create(&CreateNoticiaDto::new(titulo, descricao))
                .await
                .context("作成に失敗")?;
            print_json(&created)
        }
        Command::Update {
            id,
            titulo,
            descricao,
        } => {
            let dto = UpdateNoticiaDto {
                titulo,
                descricao,
                ..UpdateNoticiaDto::default()
            };
            let updated = repository
                .update(&id, &dto)
                .await
                .with_context(|| format!("ID {} の更新に失敗", id))?;
            print_json(&updated)
        }
        Command::Delete { id } => {
            repository
                .delete_by_id(&id)
                .await
                .with_context(|| format!("ID {} の削除に失敗", id))?;
            println!("ID {} を削除しました", id);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSONへの変換に失敗")?;
    println!("{}", text);
    Ok(())
}
