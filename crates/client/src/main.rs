//! `setlist-watch`: follows the server's setlists and prints the selected
//! one whenever it changes.

use std::sync::Arc;

use setlist_client::api::HttpApi;
use setlist_client::config::ClientConfig;
use setlist_client::feed::EventFeed;
use setlist_client::selection::FileSelectionStore;
use setlist_client::sync::Synchronizer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = ClientConfig::from_env();
    tracing::info!(api_url = %config.api_url, "Loaded client configuration");

    let api = Arc::new(HttpApi::new(config.api_url.clone()));
    let selection = Arc::new(FileSelectionStore::new(config.selection_file.clone()));
    let (feed, mut events) = EventFeed::new(config.ws_url()).spawn();

    let (sync, mut notices) = Synchronizer::new(api, selection, config.debounce);
    let sync = sync.with_feed(feed.clone());
    sync.load().await?;

    let mut printed = print_if_changed(&sync, None).await;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::warn!("Event feed ended");
                    break;
                };
                if let Err(e) = sync.apply_event(&event).await {
                    tracing::error!(error = %e, event = event.name(), "Failed to apply event");
                }
                printed = print_if_changed(&sync, printed).await;
            }
            Some(notice) = notices.recv() => {
                eprintln!("{}", notice.message);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, stopping");
                break;
            }
        }
    }

    feed.shutdown();
    Ok(())
}

/// Print the selected setlist if its text differs from `last`.
async fn print_if_changed(sync: &Synchronizer, last: Option<String>) -> Option<String> {
    let rendered = sync.state().await.rendered();
    if rendered != last {
        match &rendered {
            Some(text) => println!("{text}"),
            None => println!("(no setlist selected)\n"),
        }
    }
    rendered
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "setlist_client=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
