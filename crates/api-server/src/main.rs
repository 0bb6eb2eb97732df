//! API Server Binary Entry Point

use anyhow::Context;
use html2xlsx_api_server::{start_server, ApiState};
use html2xlsx_common::config::load_from_env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "html2xlsx_api_server=info,html2xlsx_pipeline=info,\
    html2xlsx_extract=info,html2xlsx_render=info,html2xlsx_workbook=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_from_env()?;
    let server = &config.server;
    tracing::info!(
        "Server configuration: max concurrent {}, workers {}, max file size {}MB, timeout {}s",
        server.max_concurrent_requests,
        server.max_workers,
        server.max_file_size_mb(),
        server.request_timeout_secs
    );

    let addr = server.bind_addr.clone();
    let state = ApiState::new(config);

    tracing::info!("Starting HTML to Excel Converter API Server");
    start_server(&addr, state)
        .await
        .with_context(|| format!("Server on {addr} stopped"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_library_crates() {
        for target in [
            "html2xlsx_api_server",
            "html2xlsx_pipeline",
            "html2xlsx_extract",
            "html2xlsx_render",
            "html2xlsx_workbook",
        ] {
            assert!(DEFAULT_FILTER.contains(target), "{target} missing");
        }
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
