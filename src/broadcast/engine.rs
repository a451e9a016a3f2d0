//! Broadcast engine implementation

use std::sync::Arc;

use crate::protocol::ServerEvent;
use crate::registry::ConnectionRegistry;
use crate::stats::ServerStats;
use crate::{ParticipantId, RoomId};

/// Delivers events to every session registered in a room
///
/// Cheap to clone; all state is shared behind `Arc`s.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    stats: Arc<ServerStats>,
}

impl Broadcaster {
    /// Create an engine over the given registry.
    pub fn new(registry: Arc<ConnectionRegistry>, stats: Arc<ServerStats>) -> Self {
        Self { registry, stats }
    }

    /// Deliver `event` to every session in `room`'s current snapshot.
    ///
    /// Returns the number of successful deliveries. Recipients whose
    /// transport fails are evicted from the registry as an implicit
    /// disconnect; when other participants remain, they receive a follow-up
    /// `presence:left` for the evicted session. Eviction fallout is processed
    /// iteratively, so a cascade of dead transports drains a room without
    /// recursing.
    pub async fn broadcast(&self, room: RoomId, event: ServerEvent) -> usize {
        let mut delivered = 0;
        let mut pending = vec![(room, event)];

        while let Some((room, event)) = pending.pop() {
            self.stats.record_broadcast();

            // Snapshot first; delivery I/O happens with no lock held.
            let targets = self.registry.delivery_targets(room).await;
            let mut failed = Vec::new();

            for target in targets {
                match target.deliver(event.clone()).await {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::debug!(
                            room = room,
                            participant = target.participant_id,
                            session = target.session_id,
                            error = %e,
                            "Delivery failed, treating recipient as disconnected"
                        );
                        failed.push(target);
                    }
                }
            }

            for target in failed {
                self.stats.record_delivery_failure();

                // Identity-checked: if a newer session already replaced this
                // one, the registry entry stays and nothing is announced.
                let removed = self
                    .registry
                    .deregister(room, target.participant_id, target.session_id)
                    .await;
                if !removed {
                    continue;
                }
                self.stats.record_close();

                let remaining = self.registry.active_participants(room).await;
                if !remaining.is_empty() {
                    pending.push((
                        room,
                        ServerEvent::presence_left(room, target.participant_id, remaining),
                    ));
                }
            }
        }

        delivered
    }

    /// Deliver one event to a single participant's session in `room`.
    ///
    /// Best-effort: failures are logged and otherwise dropped. Used for
    /// per-sender `error` events, which are not worth an eviction cascade.
    pub async fn send_personal(
        &self,
        room: RoomId,
        participant: ParticipantId,
        event: ServerEvent,
    ) {
        let Some(target) = self.registry.target(room, participant).await else {
            return;
        };

        if let Err(e) = target.deliver(event).await {
            tracing::debug!(
                room = room,
                participant = participant,
                session = target.session_id,
                error = %e,
                "Personal delivery failed"
            );
        }
    }
}
