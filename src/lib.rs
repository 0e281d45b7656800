//! A Flappy Bird clone for the terminal.
//!
//! [`session::GameSession`] holds the rules and talks to three collaborators:
//! a [`session::Presenter`] ([`scene::Scene`] on a terminal), a
//! [`sound::SoundPlayer`] and a [`store::ScoreStore`].
//! [`scheduler::Scheduler`] drives it from the wall clock.

pub mod config;
pub mod pixel;
pub mod scene;
pub mod scheduler;
pub mod session;
pub mod sound;
pub mod store;
