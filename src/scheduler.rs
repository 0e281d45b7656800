//! Two periodic tasks, tick and spawn, driving a [`GameSession`].

use crate::config::Tuning;
use crate::session::{GameSession, Phase, Presenter};
use crate::sound::SoundPlayer;
use crate::store::ScoreStore;
use rand::Rng;
use std::time::{Duration, Instant};

/// A fixed-period timer polled against a caller-supplied clock.
#[derive(Debug, Clone)]
pub struct Periodic {
    period: Duration,
    next_due: Option<Instant>,
}

impl Periodic {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// First firing is one full period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Consume one firing if it is due. Missed periods are delivered one
    /// call at a time.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(at) if at <= now => {
                self.next_due = Some(at + self.period);
                true
            }
            _ => false,
        }
    }
}

pub struct Scheduler {
    tick: Periodic,
    spawn: Periodic,
}

impl Scheduler {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tick: Periodic::new(tuning.tick_period()),
            spawn: Periodic::new(tuning.spawn_period()),
        }
    }

    pub fn start(&mut self, now: Instant) {
        log::debug!("timers armed");
        self.tick.start(now);
        self.spawn.start(now);
    }

    pub fn stop(&mut self) {
        if self.is_running() {
            log::debug!("timers stopped");
        }
        self.tick.stop();
        self.spawn.stop();
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_running() || self.spawn.is_running()
    }

    /// Run every callback due at `now`, oldest first, one at a time. Both
    /// timers stop as soon as a callback leaves the session not running;
    /// anything still queued is dropped. Returns the number of callbacks run.
    pub fn run_due<P, S, B, R>(
        &mut self,
        now: Instant,
        session: &mut GameSession<P, S, B>,
        rng: &mut R,
    ) -> usize
    where
        P: Presenter,
        S: SoundPlayer,
        B: ScoreStore,
        R: Rng,
    {
        let mut ran = 0;
        loop {
            let tick_at = self.tick.next_due().filter(|at| *at <= now);
            let spawn_at = self.spawn.next_due().filter(|at| *at <= now);
            match (tick_at, spawn_at) {
                (None, None) => break,
                (Some(t), Some(s)) if s < t => {
                    self.spawn.due(now);
                    session.spawn(rng);
                }
                (Some(_), _) => {
                    self.tick.due(now);
                    session.tick();
                }
                (None, Some(_)) => {
                    self.spawn.due(now);
                    session.spawn(rng);
                }
            }
            ran += 1;

            if session.phase() != Phase::Running {
                self.stop();
                break;
            }
        }
        ran
    }
}
