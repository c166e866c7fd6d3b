use chrono::Local;
use log::info;
use sakura_inbox::client::{InboxParams, InboxType, SyncClient};
use sakura_inbox::config::ClientConfig;
use sakura_inbox::transport::TokioWebSocketTransportFactory;
use sakura_inbox_ureq_http_client::UreqHttpClient;
use std::sync::Arc;

// Headless inbox monitor: loads a section, then follows push updates.
//
// Usage:
//   cargo run                                        # admin view, unified inbox
//   cargo run -- --section my-inbox-escalated        # one section
//   cargo run -- -s agent-inbox-active -e me@co.com  # scoped to one owner
//   cargo run -- -e me@co.com --user-id u42          # owner id beats email

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let email = parse_arg(&args, "--email", "-e").unwrap_or_else(|| "admin@heirs.com".to_string());
    let section = parse_arg(&args, "--section", "-s").unwrap_or_else(|| "unified-inbox".to_string());
    let user_id = parse_arg(&args, "--user-id", "-u");

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");

    rt.block_on(async {
        let config = ClientConfig::from_env();
        info!("API base: {}, push: {}", config.api_base, config.ws_url);

        let client = SyncClient::new(
            config,
            InboxParams {
                inbox_type: InboxType::Agent,
                user_email: email,
                user_id,
                section,
            },
            Arc::new(UreqHttpClient::new()),
            Arc::new(TokioWebSocketTransportFactory::new()),
        );

        // Log every rebuild of the view model.
        let mut refreshed = client.event_bus.chats_refreshed.subscribe();
        tokio::spawn(async move {
            while let Ok(chats) = refreshed.recv().await {
                for chat in chats.iter() {
                    info!(
                        "  [{}] {}: {} ({} unread)",
                        chat.summary.section,
                        chat.summary.name,
                        chat.summary.last_message,
                        chat.summary.unread_count
                    );
                }
            }
        });

        client.load_chats().await;
        let snapshot = client.snapshot().await;
        match &snapshot.error {
            Some(error) => info!("Initial load failed: {error}"),
            None => info!("Initial load: {} chats", snapshot.chats.len()),
        }

        let runner = client.clone();
        let loop_handle = tokio::spawn(runner.run());

        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down");
        client.shutdown().await;
        loop_handle.await.ok();
    });
}

fn parse_arg(args: &[String], long: &str, short: &str) -> Option<String> {
    args.iter()
        .position(|a| a == long || a == short)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
