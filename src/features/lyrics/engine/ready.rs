//! Deferral of calls that need a measured view
//!
//! Before the host reports a viewport size there are no line offsets to
//! animate toward. Calls made in that window are held and handed back in
//! order once, when the gate opens.

/// Call that had to wait for the first viewport size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCall {
    UpdateTime { time_ms: u64, force: bool },
}

/// One-shot gate: queue while closed, pass through once open
#[derive(Debug, Clone)]
pub struct ReadyGate<T> {
    ready: bool,
    pending: Vec<T>,
}

impl<T> ReadyGate<T> {
    pub fn new() -> Self {
        Self {
            ready: false,
            pending: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns the call back when it may run now, otherwise keeps it
    pub fn submit(&mut self, call: T) -> Option<T> {
        if self.ready {
            Some(call)
        } else {
            self.pending.push(call);
            None
        }
    }

    /// Open the gate; yields the queued calls the first time only
    pub fn open(&mut self) -> Vec<T> {
        self.ready = true;
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl<T> Default for ReadyGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queues_until_open_then_passes_through() {
        let mut gate = ReadyGate::new();
        assert_eq!(gate.submit(1), None);
        assert_eq!(gate.submit(2), None);
        assert_eq!(gate.pending(), 2);

        assert_eq!(gate.open(), [1, 2]);
        assert!(gate.is_ready());
        assert_eq!(gate.submit(3), Some(3));
        assert!(gate.open().is_empty());
    }
}
