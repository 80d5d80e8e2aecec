use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use folio::cms::CmsConfig;
use folio::config::{Cli, Command, Config, default_config_dir, default_config_path};
use folio::content::ContentStore;
use folio::handler::{AppState, router};
use folio::page::Page;
use folio::scene;
use folio::theme::FileStore;
use folio::unpack_error;
use tokio::{signal, sync::Mutex};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // With --config, preferences live next to the config file, otherwise
    // under ~/.folio/
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });

    let content = ContentStore::load(Path::new(&cfg.site.content_dir)).unwrap_or_else(|e| {
        tracing::error!(error = %unpack_error(&e), "content validation failed");
        std::process::exit(1);
    });
    let cms = CmsConfig::build(&cfg.cms, &cfg.site.content_dir, &cfg.site.public_folder);

    match args.command.unwrap_or_default() {
        Command::Check => {
            tracing::info!(
                posts = content.blog.len(),
                side_projects = content.side_projects.len(),
                "content is valid"
            );
        }
        Command::Cms => match serde_json::to_string_pretty(&cms) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode cms config");
                std::process::exit(1);
            }
        },
        Command::Serve => serve(cfg, content, cms, &data_dir).await,
    }
}

async fn serve(cfg: Config, content: ContentStore, cms: CmsConfig, data_dir: &Path) {
    tracing::info!("folio.svc starting");

    let store = FileStore::open(data_dir.join("preferences.json")).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to open preference store");
        std::process::exit(1);
    });
    let page = Page::open(store, &cfg.scene).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to set up scene");
        std::process::exit(1);
    });

    let cancellation_token = CancellationToken::new();
    let animation = tokio::spawn(scene::animate(
        page.scene().clone(),
        cfg.scene.frame_interval(),
        cancellation_token.clone(),
    ));

    let address = format!("0.0.0.0:{}", cfg.site.get_port());
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = router(AppState {
        site: Arc::new(cfg.site),
        content: Arc::new(content),
        cms: Arc::new(cms),
        page: Arc::new(Mutex::new(page)),
    })
    .layer(cors);

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("folio.svc running on {}", &address);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server stopped unexpectedly");
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
        }
    }

    cancellation_token.cancel();
    if let Err(e) = animation.await {
        tracing::warn!(error = %e, "scene animation task failed");
    }
    tracing::info!("folio.svc going off, graceful shutdown complete");
}
