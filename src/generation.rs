//! Staleness guard for async completions.
//!
//! Each async operation takes a [`Ticket`] when it starts. Its result may
//! only be applied while the ticket is still current; starting a newer
//! operation or calling [`Generation::invalidate`] (form reset, navigation,
//! trip switch) makes every outstanding ticket stale.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default, Clone)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new operation; all earlier tickets become stale.
    pub fn next(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}
