use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Idle sessions older than this are pruned.
pub const SESSION_TTL: Duration = Duration::from_secs(3600);

/// How a user's images are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Read text out of images and fact-check it.
    #[default]
    FactCheck,
    /// Rate images for signs of manipulation or generation.
    ImageForensics,
}

#[derive(Debug)]
struct Session {
    mode: Mode,
    last_seen: Instant,
}

/// Per-user chat state, keyed by the caller's user id.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Current mode, creating the session on first contact.
    pub async fn touch(&self, user_id: &str) -> Mode {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(user_id.to_string()).or_insert_with(|| {
            debug!(user_id, "Session created");
            Session {
                mode: Mode::default(),
                last_seen: Instant::now(),
            }
        });
        session.last_seen = Instant::now();
        session.mode
    }

    pub async fn set_mode(&self, user_id: &str, mode: Mode) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        sessions
            .entry(user_id.to_string())
            .and_modify(|s| {
                s.mode = mode;
                s.last_seen = now;
            })
            .or_insert(Session {
                mode,
                last_seen: now,
            });
    }

    /// Back to plain fact-checking.
    pub async fn reset(&self, user_id: &str) {
        self.set_mode(user_id, Mode::FactCheck).await;
    }

    /// Drop sessions idle for longer than the TTL. Returns how many went.
    pub async fn prune(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, s| s.last_seen.elapsed() < ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "Idle sessions pruned");
        }
        pruned
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
