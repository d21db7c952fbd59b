/// Persistent connection to the notification hub.
///
/// The connection is token-gated: without stored credentials it never dials.
/// Once up, it joins the account's notification group, funnels push events
/// into the feed, and rides out transport drops with a fixed reconnect
/// ladder. Hub failures never propagate; the worst outcome is a quiet feed.
pub mod protocol;

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::feed::NotificationFeed;
use crate::session::claims::account_id_from_token;
use crate::session::SessionStore;
use protocol::HubMessage;

/// Push event names the backend raises for account-scoped notifications.
/// Different backend code paths use different names; all funnel into the
/// same normalization.
pub const NOTIFICATION_EVENTS: [&str; 5] = [
    "ReceiveNotification",
    "Notification",
    "NewNotification",
    "ActivityCreated",
    "ActivityNotification",
];

/// Delay ladder between reconnect attempts after an established connection
/// drops. Once the ladder is exhausted the connection gives up until
/// restarted.
pub const RECONNECT_DELAYS: [Duration; 4] = [
    Duration::ZERO,
    Duration::from_secs(2),
    Duration::from_secs(10),
    Duration::from_secs(30),
];

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    /// No credentials, nothing dialed.
    Idle,
    /// First dial in progress.
    Connecting,
    /// Socket up, handshake accepted, events flowing.
    Connected,
    /// Established connection dropped; the ladder is running.
    Reconnecting,
    /// Torn down, or gave up reconnecting.
    Stopped,
}

impl HubState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HubState::Idle => "idle",
            HubState::Connecting => "connecting",
            HubState::Connected => "connected",
            HubState::Reconnecting => "reconnecting",
            HubState::Stopped => "stopped",
        }
    }
}

pub struct HubConnection {
    url: String,
    store: Arc<dyn SessionStore>,
    feed: Arc<NotificationFeed>,
    state_tx: watch::Sender<HubState>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HubConnection {
    pub fn new(url: &str, store: Arc<dyn SessionStore>, feed: Arc<NotificationFeed>) -> Self {
        let (state_tx, _) = watch::channel(HubState::Idle);
        let (shutdown_tx, _) = watch::channel(false);
        HubConnection {
            url: url.to_string(),
            store,
            feed,
            state_tx,
            shutdown_tx,
            task: Mutex::new(None),
        }
    }

    /// Dials the hub when a token is stored; with no credentials the
    /// connection stays idle and no socket is opened. The access token and
    /// the account id derived from it are captured here and reused across
    /// reconnects: a token rotated later is only honored by a full
    /// `stop()` / `start()` cycle.
    pub async fn start(&self) {
        let token = match self.store.token().await {
            Some(token) if !token.is_empty() => token,
            _ => {
                info!("no stored token, notification hub stays idle");
                return;
            }
        };

        let mut task = self.task.lock().await;
        if let Some(handle) = task.as_ref() {
            if !handle.is_finished() {
                debug!("notification hub already running");
                return;
            }
        }

        // a previous worker dropped the last shutdown receiver on exit; the
        // reset has to land in the channel even with nobody subscribed
        self.shutdown_tx.send_replace(false);
        let worker = ConnectionWorker {
            url: self.url.clone(),
            account_id: account_id_from_token(&token),
            token,
            feed: self.feed.clone(),
            state: self.state_tx.clone(),
            shutdown: self.shutdown_tx.subscribe(),
        };
        *task = Some(tokio::spawn(worker.run()));
    }

    /// Tears the connection down: the event task exits, the socket closes,
    /// close failures are ignored.
    pub async fn stop(&self) {
        // taking the task lock first serializes against a concurrent start(),
        // so the shutdown flag cannot be reset underneath us
        let mut task = self.task.lock().await;
        self.shutdown_tx.send_replace(true);
        if let Some(task) = task.take() {
            let _ = task.await;
        }
        self.state_tx.send_replace(HubState::Stopped);
    }

    /// Current state, readable without holding a watch subscription.
    pub fn state(&self) -> HubState {
        *self.state_tx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<HubState> {
        self.state_tx.subscribe()
    }
}

enum SessionOutcome {
    /// Told to stop; the worker exits.
    Shutdown,
    /// Established, then lost. Eligible for the reconnect ladder.
    Dropped,
    /// Never reached the connected state.
    ConnectFailed(String),
}

enum Dispatch {
    Continue,
    Closed,
}

struct ConnectionWorker {
    url: String,
    token: String,
    account_id: Option<i64>,
    feed: Arc<NotificationFeed>,
    state: watch::Sender<HubState>,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionWorker {
    async fn run(mut self) {
        self.state.send_replace(HubState::Connecting);

        match self.session().await {
            SessionOutcome::Shutdown => {
                self.state.send_replace(HubState::Stopped);
                return;
            }
            SessionOutcome::ConnectFailed(e) => {
                // the first dial is not retried; callers restart after fixing
                // whatever kept the hub unreachable
                warn!("notification hub connection failed: {}", e);
                self.state.send_replace(HubState::Stopped);
                return;
            }
            SessionOutcome::Dropped => {}
        }

        'reconnect: loop {
            self.state.send_replace(HubState::Reconnecting);
            debug!("notification hub dropped, reconnecting");
            for delay in RECONNECT_DELAYS {
                if self.wait_or_shutdown(delay).await {
                    break 'reconnect;
                }
                match self.session().await {
                    SessionOutcome::Shutdown => break 'reconnect,
                    // a successful session earns a fresh ladder next time
                    SessionOutcome::Dropped => continue 'reconnect,
                    SessionOutcome::ConnectFailed(e) => {
                        debug!("reconnect attempt failed: {}", e);
                    }
                }
            }
            warn!(
                "notification hub gave up after {} reconnect attempts",
                RECONNECT_DELAYS.len()
            );
            break;
        }

        self.state.send_replace(HubState::Stopped);
    }

    /// One full connection: dial, handshake, join, then pump events until
    /// the transport ends or shutdown is requested.
    async fn session(&mut self) -> SessionOutcome {
        let url = hub_url_with_token(&self.url, &self.token);

        let ws = tokio::select! {
            result = connect_async(url) => match result {
                Ok((ws, _response)) => ws,
                Err(e) => return SessionOutcome::ConnectFailed(e.to_string()),
            },
            _ = wait_shutdown(&mut self.shutdown) => return SessionOutcome::Shutdown,
        };

        let (mut write, mut read) = ws.split();

        if let Err(e) = write.send(Message::text(protocol::HANDSHAKE_REQUEST)).await {
            return SessionOutcome::ConnectFailed(e.to_string());
        }

        // the first inbound record settles the handshake; hub records may
        // ride along in the same frame
        let pending;
        loop {
            let next = tokio::select! {
                next = read.next() => next,
                _ = wait_shutdown(&mut self.shutdown) => {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionOutcome::Shutdown;
                }
            };
            match next {
                Some(Ok(Message::Text(text))) => {
                    let text = text.as_str();
                    let Some((first, rest)) = text.split_once(protocol::RECORD_SEPARATOR) else {
                        return SessionOutcome::ConnectFailed(
                            "unterminated handshake response".to_string(),
                        );
                    };
                    if let Err(e) = protocol::parse_handshake(first) {
                        return SessionOutcome::ConnectFailed(format!(
                            "handshake rejected: {}",
                            e
                        ));
                    }
                    pending = protocol::decode_frame(rest);
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return SessionOutcome::ConnectFailed(e.to_string()),
                None => {
                    return SessionOutcome::ConnectFailed(
                        "connection closed during handshake".to_string(),
                    )
                }
            }
        }

        self.state.send_replace(HubState::Connected);
        info!("notification hub connected");

        // join the account group; a failure here leaves the connection up,
        // it just never receives anything
        if let Some(account_id) = self.account_id {
            let join = protocol::encode(&HubMessage::join(account_id));
            if let Err(e) = write.send(Message::text(join)).await {
                warn!("join invocation failed: {}", e);
            }
        } else {
            debug!("token carries no usable account id, skipping join");
        }

        for record in pending {
            if let Dispatch::Closed = self.dispatch(record).await {
                return SessionOutcome::Dropped;
            }
        }

        let mut keepalive = tokio::time::interval_at(
            tokio::time::Instant::now() + KEEP_ALIVE_INTERVAL,
            KEEP_ALIVE_INTERVAL,
        );

        loop {
            tokio::select! {
                _ = wait_shutdown(&mut self.shutdown) => {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionOutcome::Shutdown;
                }
                _ = keepalive.tick() => {
                    let ping = protocol::encode(&HubMessage::Ping);
                    if write.send(Message::text(ping)).await.is_err() {
                        return SessionOutcome::Dropped;
                    }
                }
                next = read.next() => match next {
                    Some(Ok(Message::Text(text))) => {
                        for record in protocol::decode_frame(text.as_str()) {
                            if let Dispatch::Closed = self.dispatch(record).await {
                                return SessionOutcome::Dropped;
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("hub transport closed: {:?}", frame);
                        return SessionOutcome::Dropped;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("hub read error: {}", e);
                        return SessionOutcome::Dropped;
                    }
                    None => return SessionOutcome::Dropped,
                }
            }
        }
    }

    async fn dispatch(&self, message: HubMessage) -> Dispatch {
        match message {
            HubMessage::Invocation { target, arguments } => {
                if NOTIFICATION_EVENTS.contains(&target.as_str()) {
                    if let Some(payload) = arguments.first() {
                        let accepted = self.feed.ingest(payload).await;
                        debug!("event {} accepted {} notification(s)", target, accepted);
                    }
                } else {
                    debug!("ignoring hub event {}", target);
                }
                Dispatch::Continue
            }
            // inbound keepalive, nothing to do; our own pings run on a timer
            HubMessage::Ping => Dispatch::Continue,
            HubMessage::Close { error } => {
                if let Some(error) = error {
                    warn!("hub sent close: {}", error);
                }
                Dispatch::Closed
            }
        }
    }

    async fn wait_or_shutdown(&mut self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => false,
            _ = wait_shutdown(&mut self.shutdown) => true,
        }
    }
}

/// Resolves once shutdown is requested, or the handle side is gone.
async fn wait_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Builds the dial URL: http(s) schemes map to their websocket counterparts
/// and the bearer token travels as the `access_token` query parameter, the
/// only place a browser-compatible hub accepts it during the upgrade.
fn hub_url_with_token(base: &str, token: &str) -> String {
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };

    let separator = if ws_base.contains('?') { '&' } else { '?' };
    format!(
        "{}{}access_token={}",
        ws_base,
        separator,
        urlencoding::encode(token)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_url_scheme_mapping() {
        assert_eq!(
            hub_url_with_token("https://clubs.example.edu/notiHub", "tok"),
            "wss://clubs.example.edu/notiHub?access_token=tok"
        );
        assert_eq!(
            hub_url_with_token("http://localhost:5000/notiHub", "tok"),
            "ws://localhost:5000/notiHub?access_token=tok"
        );
        assert_eq!(
            hub_url_with_token("ws://localhost:5000/notiHub", "tok"),
            "ws://localhost:5000/notiHub?access_token=tok"
        );
    }

    #[test]
    fn test_hub_url_appends_to_existing_query() {
        assert_eq!(
            hub_url_with_token("ws://h/notiHub?x=1", "tok"),
            "ws://h/notiHub?x=1&access_token=tok"
        );
    }

    #[test]
    fn test_hub_url_escapes_token() {
        let url = hub_url_with_token("ws://h/notiHub", "a b+c");
        assert_eq!(url, "ws://h/notiHub?access_token=a%20b%2Bc");
    }

    #[test]
    fn test_state_names() {
        assert_eq!(HubState::Idle.as_str(), "idle");
        assert_eq!(HubState::Reconnecting.as_str(), "reconnecting");
    }

    #[tokio::test]
    async fn test_state_query_needs_no_subscriber() {
        let hub = HubConnection::new(
            "ws://localhost:9/notiHub",
            Arc::new(crate::session::MemorySessionStore::new()),
            Arc::new(NotificationFeed::new()),
        );
        assert_eq!(hub.state(), HubState::Idle);

        hub.stop().await;
        assert_eq!(hub.state(), HubState::Stopped);
    }
}
