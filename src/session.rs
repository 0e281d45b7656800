//! Game rules: the entity, the obstacle stream, scoring and the
//! Idle → Running → GameOver lifecycle.
//!
//! A [`GameSession`] never touches a clock. The [`Scheduler`] decides when
//! [`GameSession::tick`] and [`GameSession::spawn`] run, and everything
//! visible or audible goes out through the collaborator traits.
//!
//! [`Scheduler`]: crate::scheduler::Scheduler

use crate::config::Tuning;
use crate::sound::{Cue, SoundPlayer};
use crate::store::ScoreStore;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    GameOver,
}

/// Visual orientation of the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tilt {
    Level,
    NoseUp,
    NoseDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Start,
    Playing,
    GameOver { score: u32 },
}

/// What a call to [`GameSession::control`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Started,
    Jumped,
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub velocity: f64,
    pub width: f64,
    pub height: f64,
    pub tilt: Tilt,
}

impl Entity {
    fn new(tuning: &Tuning) -> Self {
        Self {
            x: tuning.entity_x,
            y: tuning.start_y(),
            velocity: 0.0,
            width: tuning.entity_width,
            height: tuning.entity_height,
            tilt: Tilt::Level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: ObstacleId,
    /// Left edge.
    pub x: f64,
    pub top_height: f64,
    pub bottom_height: f64,
    pub passed: bool,
}

/// Receives every visible state change. Implementations own all visual
/// resources; the session only hands out ids.
pub trait Presenter {
    fn entity_moved(&mut self, y: f64, tilt: Tilt);
    fn obstacle_created(&mut self, obstacle: &Obstacle);
    fn obstacle_moved(&mut self, id: ObstacleId, x: f64);
    fn obstacle_removed(&mut self, id: ObstacleId);
    fn score_changed(&mut self, score: u32);
    fn best_changed(&mut self, best: u32);
    fn overlay(&mut self, overlay: Overlay);
}

pub struct GameSession<P, S, B> {
    tuning: Tuning,
    entity: Entity,
    obstacles: Vec<Obstacle>,
    next_id: u64,
    phase: Phase,
    score: u32,
    best: u32,
    presenter: P,
    sound: S,
    store: B,
}

impl<P: Presenter, S: SoundPlayer, B: ScoreStore> GameSession<P, S, B> {
    pub fn new(tuning: Tuning, mut presenter: P, sound: S, store: B) -> Self {
        let best = store.read();
        let entity = Entity::new(&tuning);
        presenter.best_changed(best);
        presenter.score_changed(0);
        presenter.entity_moved(entity.y, entity.tilt);
        presenter.overlay(Overlay::Start);
        Self {
            tuning,
            entity,
            obstacles: Vec::new(),
            next_id: 0,
            phase: Phase::Idle,
            score: 0,
            best,
            presenter,
            sound,
            store,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The single input action: start when idle, flap while running.
    pub fn control(&mut self) -> Control {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Running;
                self.presenter.overlay(Overlay::Playing);
                log::debug!("game started (best {})", self.best);
                Control::Started
            }
            Phase::Running => {
                self.entity.velocity = self.tuning.jump;
                self.entity.tilt = Tilt::NoseUp;
                self.sound.play(Cue::Jump);
                self.presenter
                    .entity_moved(self.entity.y, self.entity.tilt);
                Control::Jumped
            }
            Phase::GameOver => Control::Ignored,
        }
    }

    /// Advance one fixed step. Does nothing unless running.
    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        // Integrate
        self.entity.velocity += self.tuning.gravity;
        self.entity.y += self.entity.velocity;
        if self.entity.velocity > 0.0 {
            self.entity.tilt = Tilt::NoseDown;
        }
        self.presenter
            .entity_moved(self.entity.y, self.entity.tilt);

        if self.entity.y > self.tuning.floor_y() || self.entity.y < 0.0 {
            log::debug!("out of bounds at y={:.1}", self.entity.y);
            self.game_over();
            return;
        }

        let band_left = self.entity.x - self.tuning.obstacle_width;
        let band_right = self.entity.x + self.entity.width;
        let score_line = self.tuning.score_line();
        let gap_floor = self.tuning.height;
        let mut collided = false;

        for obs in &mut self.obstacles {
            let before = obs.x;
            obs.x -= self.tuning.speed;
            self.presenter.obstacle_moved(obs.id, obs.x);

            if obs.x > band_left && obs.x < band_right {
                let hits_top = self.entity.y < obs.top_height;
                let hits_bottom =
                    self.entity.y + self.entity.height > gap_floor - obs.bottom_height;
                if hits_top || hits_bottom {
                    log::debug!("collision with obstacle {:?}", obs.id);
                    collided = true;
                    break;
                }
            }

            // The score band is exactly one tick of travel wide.
            if !obs.passed && before > score_line && obs.x <= score_line {
                obs.passed = true;
                self.score += 1;
                self.sound.play(Cue::Score);
                self.presenter.score_changed(self.score);
            }
        }

        if collided {
            self.game_over();
            return;
        }

        let cutoff = -(self.tuning.obstacle_width + self.tuning.prune_margin);
        let presenter = &mut self.presenter;
        self.obstacles.retain(|obs| {
            let keep = obs.x >= cutoff;
            if !keep {
                presenter.obstacle_removed(obs.id);
            }
            keep
        });
    }

    /// Add one obstacle at the right edge with a random gap position.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R) {
        if self.phase != Phase::Running {
            return;
        }

        let t = &self.tuning;
        let lo = t.min_height.ceil() as i64;
        let hi = (t.height - t.gap - t.min_height).floor() as i64;
        let top_height = if hi > lo {
            rng.gen_range(lo..=hi) as f64
        } else {
            t.min_height
        };
        let obstacle = Obstacle {
            id: ObstacleId(self.next_id),
            x: t.width,
            top_height,
            bottom_height: t.height - t.gap - top_height,
            passed: false,
        };
        self.next_id += 1;

        self.presenter.obstacle_created(&obstacle);
        self.obstacles.push(obstacle);
    }

    /// End the running game. Outside Running this does nothing, so repeated
    /// calls are harmless.
    pub fn game_over(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::GameOver;
        self.sound.play(Cue::Hit);

        if self.score > self.best {
            log::info!("new best score {} (was {})", self.score, self.best);
            self.best = self.score;
            self.store.write(self.best);
            self.presenter.best_changed(self.best);
        }

        self.presenter.overlay(Overlay::GameOver { score: self.score });
    }

    /// Back to a fresh idle game. The best score survives.
    pub fn reset(&mut self) {
        for obs in self.obstacles.drain(..) {
            self.presenter.obstacle_removed(obs.id);
        }
        self.entity = Entity::new(&self.tuning);
        self.score = 0;
        self.phase = Phase::Idle;

        self.presenter.score_changed(0);
        self.presenter
            .entity_moved(self.entity.y, self.entity.tilt);
        self.presenter.overlay(Overlay::Start);
    }
}
