use std::time::{Duration, Instant};

/// Monotonic wall-clock stopwatch.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1_000.0
    }

    pub fn elapsed_us(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1_000_000.0
    }

    pub fn elapsed_ns(&self) -> u128 {
        self.elapsed().as_nanos()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_units_agree() {
        let sw = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(2));
        let ns = sw.elapsed_ns();
        let ms = sw.elapsed_ms();
        assert!(ns >= 2_000_000);
        assert!(ms >= 2.0);
        assert!(sw.elapsed_us() >= 2_000.0);
    }

    #[test]
    fn reset_restarts_the_clock() {
        let mut sw = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(5));
        sw.reset();
        assert!(sw.elapsed() < Duration::from_millis(5_000));
        assert!(sw.elapsed_ns() < 5_000_000_000);
    }
}
