use embassy_time::{Duration, Instant};

/// Spin-wait timer for settle delays and control-pin pulses.
pub struct BlockingTimer {
    expires_at: Instant,
}

impl BlockingTimer {
    pub fn after(duration: Duration) -> Self {
        Self {
            expires_at: Instant::now() + duration,
        }
    }

    pub fn wait(self) {
        loop {
            if self.expires_at <= Instant::now() {
                break;
            }
        }
    }
}

/// Block for `duration`.
pub fn block_for(duration: Duration) {
    BlockingTimer::after(duration).wait();
}
