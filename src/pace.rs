use std::time::Duration;

/// Fixed-delay pacing between consecutive requests or writes.
///
/// Keeps a local single-worker inference server (and whatever syncs the
/// vault) from being flooded. A zero delay never sleeps.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}
