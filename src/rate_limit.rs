use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

// Callers that do not identify themselves all share this key, so anonymous
// traffic is throttled collectively rather than per client.
pub const GLOBAL_KEY: &str = "global";

// Throttle entry - tracks the last accepted request per key
pub struct ThrottleRecord {
    pub last_request_at: Instant,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleDecision {
    pub limited: bool,
    pub remaining_seconds: u64,
}

impl ThrottleDecision {
    fn allowed() -> Self {
        Self {
            limited: false,
            remaining_seconds: 0,
        }
    }
}

// Cooldown gate over a process-lifetime map. Entries are upserted on each
// accepted request and never removed.
pub struct Throttle {
    records: DashMap<String, ThrottleRecord>,
    cooldown: Duration,
}

impl Throttle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            records: DashMap::new(),
            cooldown,
        }
    }

    // Check-and-set in a single map operation. A limited request never moves
    // the recorded timestamp forward, so `last_request_at` only advances on
    // accepted requests.
    pub fn check(&self, key: Option<&str>) -> ThrottleDecision {
        let key = key.unwrap_or(GLOBAL_KEY);
        let now = Instant::now();

        match self.records.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let elapsed = occupied.get().last_request_at.elapsed();
                if elapsed < self.cooldown {
                    return ThrottleDecision {
                        limited: true,
                        remaining_seconds: remaining_secs(self.cooldown, elapsed),
                    };
                }

                let count = occupied.get().count;
                occupied.insert(ThrottleRecord {
                    last_request_at: now,
                    count: count.saturating_add(1),
                });
                ThrottleDecision::allowed()
            }
            Entry::Vacant(vacant) => {
                vacant.insert(ThrottleRecord {
                    last_request_at: now,
                    count: 1,
                });
                ThrottleDecision::allowed()
            }
        }
    }
}

// Seconds left in the cooldown window, rounded up; 0 only once the window
// has fully elapsed.
fn remaining_secs(cooldown: Duration, elapsed: Duration) -> u64 {
    cooldown
        .saturating_sub(elapsed)
        .as_millis()
        .div_ceil(1000) as u64
}
