use wb_core::board::BoardId;
use wb_core::direction::Position;
use wb_core::entity::EntityId;

/// What kind of round event occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEventKind {
    /// An entity moved to a new cell.
    Moved {
        /// The entity that moved.
        entity: EntityId,
        /// The board it now occupies.
        board: BoardId,
        /// The cell it landed on.
        to: Position,
    },
    /// An entity left one board for another.
    Crossed {
        /// The entity that crossed.
        entity: EntityId,
        /// The board it left.
        from: BoardId,
        /// The board it entered.
        to: BoardId,
    },
    /// An entity was replaced by one of another kind.
    Transformed {
        /// The entity that was replaced.
        entity: EntityId,
        /// The wire type name of the replacement.
        into: String,
    },
    /// An entity was deleted by a destruction phase.
    Destroyed {
        /// The deleted entity.
        entity: EntityId,
        /// Which phase deleted it.
        cause: String,
    },
    /// An entity was relocated by the teleport phase.
    Teleported {
        /// The relocated entity.
        entity: EntityId,
        /// The cell it was relocated to.
        to: Position,
    },
    /// The select phase reported a board.
    Selected {
        /// The reported board name.
        board: String,
    },
    /// A You entity reached a Win entity.
    Won,
}

impl RoundEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::Moved { entity, .. }
            | Self::Crossed { entity, .. }
            | Self::Transformed { entity, .. }
            | Self::Destroyed { entity, .. }
            | Self::Teleported { entity, .. } => *entity == id,
            Self::Selected { .. } | Self::Won => false,
        }
    }
}

/// A record of something that happened during a round.
#[derive(Debug, Clone)]
pub struct RoundEvent {
    /// The round when this event occurred.
    pub round: u64,
    /// The specific kind of event that occurred.
    pub kind: RoundEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl RoundEvent {
    /// Create a new round event.
    pub fn new(round: u64, kind: RoundEventKind, description: impl Into<String>) -> Self {
        Self {
            round,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events across rounds.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<RoundEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its
    /// capacity.
    pub fn push(&mut self, event: RoundEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    /// Return all events that occurred during the given round.
    pub fn events_at_round(&self, round: u64) -> Vec<&RoundEvent> {
        self.events.iter().filter(|e| e.round == round).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&RoundEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(round: u64, entity: EntityId) -> RoundEvent {
        RoundEvent::new(
            round,
            RoundEventKind::Moved {
                entity,
                board: BoardId::new(),
                to: Position::new(0, 0),
            },
            "test",
        )
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        let id = EntityId::new();
        log.push(moved(1, id));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at_round(1).len(), 1);
        assert_eq!(log.events_for_entity(id).len(), 1);
        assert_eq!(log.events_for_entity(EntityId::new()).len(), 0);
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        let id = EntityId::new();
        for round in 0..5 {
            log.push(moved(round, id));
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].round, 3);
        assert_eq!(log.events()[1].round, 4);
    }

    #[test]
    fn won_and_selected_involve_nobody() {
        assert!(!RoundEventKind::Won.involves(EntityId::new()));
        assert!(
            !RoundEventKind::Selected {
                board: "main".into()
            }
            .involves(EntityId::new())
        );
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(moved(1, EntityId::new()));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }
}
