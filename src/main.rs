mod swiper;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use swipe_session::api::{HttpSwipeApi, OfflineApi, SwipeApi};
use swipe_session::config::Config;
use swipe_session::session::{SessionOptions, SwipeClient, SwipeSession};
use swipe_session::store::{JsonFileStore, KeyValueStore};

use crate::swiper::Swiper;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let api: Arc<dyn SwipeApi> = match &cfg.api_base_url {
        Some(url) => {
            info!("Using swipe API at {}", url);
            Arc::new(HttpSwipeApi::new(url, &cfg)?)
        }
        None => {
            info!("No SWIPE_API_URL set, running offline on the built-in catalog");
            Arc::new(OfflineApi)
        }
    };
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&cfg.data_dir));

    let client = Arc::new(SwipeClient::new(api, store, &cfg));
    let session = SwipeSession::new(client, SessionOptions::from_config(&cfg))?;

    let mut swiper = Swiper::new(session);
    swiper.run().await?;

    Ok(())
}
