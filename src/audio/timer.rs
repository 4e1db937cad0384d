//! Cancellable one-shot timers keyed on the graph clock

/// Handle returned by [`TimerQueue::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due: f64,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, due: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer { id, due, payload });
        id
    }

    /// Returns false if the timer already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.pending.iter().position(|t| t.id == id) {
            Some(i) => {
                self.pending.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove and return the earliest timer due at or before `now`.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: f64) -> Option<(TimerId, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;
        let timer = self.pending.remove(index);
        Some((timer.id, timer.payload))
    }

    pub fn next_due(&self) -> Option<f64> {
        self.pending.iter().map(|t| t.due).min_by(f64::total_cmp)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
