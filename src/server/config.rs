//! Server configuration

/// Configuration options for [`ChatServer`](super::ChatServer)
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Buffered events per connection for channel transports created by
    /// `connect_channel`. A slow client applies backpressure to deliveries
    /// targeting it once the buffer fills.
    pub delivery_buffer: usize,

    /// Default number of messages returned by the recent-history query.
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            delivery_buffer: 64,
            history_limit: 50,
        }
    }
}

impl ChatConfig {
    /// Set the per-connection delivery buffer.
    pub fn delivery_buffer(mut self, capacity: usize) -> Self {
        self.delivery_buffer = capacity.max(1);
        self
    }

    /// Set the default history query limit.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}
