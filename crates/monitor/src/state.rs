use {
    chrono::{DateTime, Utc},
    freebot_channels::{GuildId, UserId},
};

/// Busy/free state of a monitored channel.
///
/// The occupant lives inside the `Busy` variant, so a free channel can never
/// carry one and a busy channel always does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Free,
    Busy {
        occupant: UserId,
        since: DateTime<Utc>,
    },
}

/// In-memory state for one monitored channel.
#[derive(Debug, Clone)]
pub struct ChannelState {
    pub guild_id: GuildId,
    pub availability: Availability,
}

impl ChannelState {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            availability: Availability::Free,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.availability, Availability::Busy { .. })
    }

    pub fn occupant(&self) -> Option<UserId> {
        match self.availability {
            Availability::Busy { occupant, .. } => Some(occupant),
            Availability::Free => None,
        }
    }

    pub fn busy_since(&self) -> Option<DateTime<Utc>> {
        match self.availability {
            Availability::Busy { since, .. } => Some(since),
            Availability::Free => None,
        }
    }

    /// Free → busy. Returns `false` and keeps the current occupant if the
    /// channel is already busy.
    pub fn claim(&mut self, user_id: UserId, now: DateTime<Utc>) -> bool {
        if self.is_busy() {
            return false;
        }
        self.availability = Availability::Busy {
            occupant: user_id,
            since: now,
        };
        true
    }

    /// Busy → free. Returns `false` if the channel was already free.
    pub fn release(&mut self) -> bool {
        let was_busy = self.is_busy();
        self.availability = Availability::Free;
        was_busy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_channel_is_free() {
        let state = ChannelState::new(GuildId::new(1));
        assert!(!state.is_busy());
        assert_eq!(state.occupant(), None);
        assert_eq!(state.busy_since(), None);
    }

    #[test]
    fn first_claim_wins() {
        let mut state = ChannelState::new(GuildId::new(1));
        let now = Utc::now();
        assert!(state.claim(UserId::new(10), now));
        assert!(!state.claim(UserId::new(20), now));
        assert_eq!(state.occupant(), Some(UserId::new(10)));
        assert_eq!(state.busy_since(), Some(now));
    }

    #[test]
    fn release_clears_occupant_and_is_repeatable() {
        let mut state = ChannelState::new(GuildId::new(1));
        state.claim(UserId::new(10), Utc::now());
        assert!(state.release());
        assert!(!state.release());
        assert!(!state.is_busy());
        assert_eq!(state.occupant(), None);
        assert_eq!(state.busy_since(), None);
    }
}
