use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;
mod logic;
mod state;
mod storage;

use crate::handlers::router;
use crate::state::AppState;
use crate::storage::{FileStorage, S3Storage, S3StorageConfig, Storage};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    File,
    S3,
}

#[derive(Parser)]
#[command(author, version, about = "Day record store for daybook surfaces")]
struct Args {
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Backend::File)]
    storage: Backend,
    #[arg(long)]
    s3_bucket: Option<String>,
    #[arg(long)]
    s3_prefix: Option<String>,
    #[arg(long)]
    s3_region: Option<String>,
    #[arg(long)]
    s3_endpoint: Option<String>,
    #[arg(long)]
    s3_force_path_style: bool,
}

async fn build_storage(args: Args) -> anyhow::Result<Arc<dyn Storage>> {
    match args.storage {
        Backend::File => {
            let data_dir = args
                .data_dir
                .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../days"));
            tokio::fs::create_dir_all(&data_dir)
                .await
                .with_context(|| format!("failed to create {}", data_dir.display()))?;
            info!(data_dir = %data_dir.display(), "using file storage");
            Ok(Arc::new(FileStorage::new(data_dir)))
        }
        Backend::S3 => {
            let bucket = args
                .s3_bucket
                .context("--s3-bucket is required with --storage s3")?;
            let mut config = S3StorageConfig::new(bucket);
            config.prefix = args.s3_prefix;
            config.region = args.s3_region;
            config.endpoint_url = args.s3_endpoint;
            config.force_path_style = args.s3_force_path_style;
            config.access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok();
            config.secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok();
            info!(bucket = %config.bucket, "using s3 storage");
            Ok(Arc::new(S3Storage::new(config).await))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let state = AppState::new(build_storage(args).await?);
    let app = router(state).layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Daybook store listening on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server crashed")?;
    Ok(())
}
