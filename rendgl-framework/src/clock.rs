use std::time::{Duration, Instant};

/// Splits frame time into fixed size physics steps.
///
/// Time left over after a frame's steps carries into the next frame. If a frame
/// would need more than `max_steps`, the backlog is dropped and physics runs in
/// slow motion instead of falling further and further behind.
#[derive(Debug, Clone)]
pub struct PhysicsClock {
    time_step: Duration,
    max_steps: u32,
    accumulated: Duration,
}

impl PhysicsClock {
    pub fn new(time_step: Duration, max_steps: u32) -> Self {
        debug_assert!(!time_step.is_zero(), "physics time step must not be zero");
        Self {
            time_step,
            max_steps,
            accumulated: Duration::ZERO,
        }
    }

    pub fn time_step(&self) -> Duration {
        self.time_step
    }

    /// Time that has passed but not been simulated yet.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Adds `elapsed` and returns how many physics steps to run this frame.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;

        let mut steps = 0;
        while self.accumulated > self.time_step {
            if steps == self.max_steps {
                log::trace!("Dropping {:?} of physics backlog", self.accumulated);
                self.accumulated = Duration::ZERO;
                break;
            }
            self.accumulated -= self.time_step;
            steps += 1;
        }
        steps
    }
}

/// Measures the time between frames and paces them to a minimum frame time.
#[derive(Debug, Clone)]
pub struct FrameClock {
    min_frame_time: Option<Duration>,
    last_frame: Instant,
}

impl FrameClock {
    pub fn new(min_frame_time: Option<Duration>, now: Instant) -> Self {
        Self {
            min_frame_time,
            last_frame: now,
        }
    }

    /// When the next frame may start, if frames are being capped and it is too early.
    pub fn wait_until(&self, now: Instant) -> Option<Instant> {
        let deadline = self.last_frame + self.min_frame_time?;
        (now < deadline).then_some(deadline)
    }

    /// Starts a frame and returns the time since the previous one.
    pub fn begin_frame(&mut self, now: Instant) -> Duration {
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(20);

    #[test]
    fn leftover_time_carries_over() {
        let mut clock = PhysicsClock::new(STEP, 10);

        assert_eq!(clock.advance(Duration::from_millis(15)), 0);
        assert_eq!(clock.advance(Duration::from_millis(15)), 1);
        assert_eq!(clock.accumulated(), Duration::from_millis(10));
        assert_eq!(clock.advance(Duration::from_millis(55)), 3);
        assert_eq!(clock.accumulated(), Duration::from_millis(5));
    }

    #[test]
    fn exact_step_waits_for_more_time() {
        let mut clock = PhysicsClock::new(STEP, 10);
        assert_eq!(clock.advance(STEP), 0);
        assert_eq!(clock.advance(Duration::from_millis(1)), 1);
    }

    #[test]
    fn backlog_is_capped() {
        let mut clock = PhysicsClock::new(STEP, 10);
        assert_eq!(clock.advance(Duration::from_secs(5)), 10);
        assert_eq!(clock.accumulated(), Duration::ZERO);
        assert_eq!(clock.advance(Duration::from_millis(30)), 1);
    }

    #[test]
    fn frame_pacing() {
        let start = Instant::now();
        let mut clock = FrameClock::new(Some(Duration::from_millis(10)), start);

        assert_eq!(clock.wait_until(start + Duration::from_millis(4)), Some(start + Duration::from_millis(10)));
        assert_eq!(clock.wait_until(start + Duration::from_millis(10)), None);

        assert_eq!(clock.begin_frame(start + Duration::from_millis(12)), Duration::from_millis(12));
        assert_eq!(clock.begin_frame(start + Duration::from_millis(15)), Duration::from_millis(3));

        let uncapped = FrameClock::new(None, start);
        assert_eq!(uncapped.wait_until(start), None);
    }
}
