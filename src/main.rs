use std::sync::Arc;

use anyhow::Context;
use club_console::api::{AuthApi, NotificationApi};
use club_console::{
    logging, AlertBus, ApiClient, Config, FileSessionStore, NotificationCenter, SessionEvent,
    SessionEvents, SessionStore,
};

/// Headless watcher: signs in (or reuses a stored session), tails the live
/// notification feed, and logs alerts and hub state changes until ctrl-c.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let config = Config::load().context("failed to load configuration")?;
    tracing::info!("club console starting against {}", config.api.base_url);

    let store = Arc::new(FileSessionStore::open(&config.session.file).await);
    let alerts = AlertBus::new();
    let events = SessionEvents::new();
    let client = ApiClient::new(
        &config.api.base_url,
        store.clone(),
        alerts.clone(),
        events.clone(),
    );

    let have_session = store
        .token()
        .await
        .map(|t| !t.is_empty())
        .unwrap_or(false);
    if !have_session {
        let username = std::env::var("CONSOLE_USERNAME").ok();
        let password = std::env::var("CONSOLE_PASSWORD").ok();
        match (username, password) {
            (Some(username), Some(password)) => {
                let auth = AuthApi::new(client.clone());
                let response = auth
                    .login(&username, &password)
                    .await
                    .context("login failed")?;
                tracing::info!(
                    "signed in as {} with roles {:?}",
                    response.user.username,
                    response.roles
                );
            }
            _ => anyhow::bail!(
                "no stored session; set CONSOLE_USERNAME and CONSOLE_PASSWORD to sign in"
            ),
        }
    }

    // catch up on server-side unread state before the live feed starts
    let api = NotificationApi::new(client.clone());
    match api.unread().await {
        Ok(unread) => tracing::info!("{} unread notification(s) on the server", unread.len()),
        Err(e) => tracing::warn!("could not fetch unread notifications: {}", e),
    }

    let center = NotificationCenter::new(&config.hub.url, client);
    center.start().await;

    let mut feed_rx = center.feed().subscribe();
    let mut state_rx = center.hub().watch_state();
    let mut alert_rx = alerts.subscribe();
    let mut session_rx = events.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
            changed = feed_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = feed_rx.borrow_and_update().clone();
                if let Some(latest) = snapshot.first() {
                    tracing::info!(
                        "[{}] {}: {} ({} unread)",
                        latest.created_at,
                        latest.title,
                        latest.message,
                        snapshot.len()
                    );
                }
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                tracing::info!("hub state: {}", state_rx.borrow_and_update().as_str());
            }
            alert = alert_rx.recv() => {
                if let Ok(alert) = alert {
                    tracing::warn!(
                        "alert [{}] {}: {}",
                        alert.kind.as_str(),
                        alert.title,
                        alert.message
                    );
                }
            }
            event = session_rx.recv() => {
                if let Ok(SessionEvent::LoggedOut) = event {
                    tracing::warn!("session expired, sign in again");
                    break;
                }
            }
        }
    }

    center.stop().await;
    Ok(())
}
