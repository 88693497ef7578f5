//! Client session management
//!
//! A session lives exactly as long as its WebSocket connection and carries
//! nothing but an identifier.

use uuid::Uuid;

/// Per-connection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSession {
    id: Uuid,
}

impl ConnectionSession {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for ConnectionSession {
    fn default() -> Self {
        Self::new()
    }
}
