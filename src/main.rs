use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute, terminal,
};
use flappy_gap::config::{self, Tuning};
use flappy_gap::pixel::PixelBuf;
use flappy_gap::scene::Scene;
use flappy_gap::scheduler::Scheduler;
use flappy_gap::session::{Control, GameSession, Phase};
use flappy_gap::sound::Audio;
use flappy_gap::store::FileScoreStore;
use std::io::{self, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

type Session = GameSession<Scene, Audio, FileScoreStore>;

const FRAME: Duration = Duration::from_millis(33); // ~30 fps

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Control,
    Reset,
    Quit,
}

fn action(ev: &Event) -> Option<Action> {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(Action::Control),
            KeyCode::Char('r') => Some(Action::Reset),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        },
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            Some(Action::Control)
        }
        _ => None,
    }
}

fn load_tuning() -> Result<Tuning> {
    match config::config_path() {
        Some(path) => Tuning::load(&path).with_context(|| format!("loading {}", path.display())),
        None => Ok(Tuning::default()),
    }
}

fn open_store() -> FileScoreStore {
    let path = FileScoreStore::default_path().unwrap_or_else(|e| {
        log::warn!("{e}; keeping best score in the working directory");
        PathBuf::from("flappy-gap-best.json")
    });
    let store = FileScoreStore::new(path);
    log::debug!("best score file: {}", store.path().display());
    store
}

fn run(out: &mut impl Write, session: &mut Session) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::for_terminal(cols, rows);
    let mut scheduler = Scheduler::new(session.tuning());
    let mut rng = rand::thread_rng();

    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            if let Event::Resize(c, r) = ev {
                buf.resize_terminal(c, r);
                continue;
            }
            match action(&ev) {
                Some(Action::Quit) => return Ok(()),
                Some(Action::Control) => {
                    if session.control() == Control::Started {
                        scheduler.start(Instant::now());
                    }
                }
                Some(Action::Reset) if session.phase() == Phase::GameOver => {
                    session.reset();
                    scheduler.stop();
                }
                _ => {}
            }
        }

        // Update
        let was_running = session.phase() == Phase::Running;
        scheduler.run_due(Instant::now(), session, &mut rng);
        if was_running && session.phase() == Phase::GameOver {
            log::info!("game over: score {} best {}", session.score(), session.best());
        }

        // Render
        session.presenter().draw(&mut buf);
        buf.render(out)?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

fn enter(out: &mut io::Stdout) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )
}

fn leave(out: &mut io::Stdout) -> io::Result<()> {
    execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let tuning = load_tuning()?;
    let scene = Scene::new(&tuning);
    let mut session = GameSession::new(tuning, scene, Audio::open(), open_store());

    let mut out = stdout();
    enter(&mut out).context("setting up terminal")?;
    let result = run(&mut out, &mut session);
    leave(&mut out).context("restoring terminal")?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_activate_inputs_share_one_action() {
        for code in [KeyCode::Char(' '), KeyCode::Up, KeyCode::Enter] {
            assert_eq!(action(&key(code)), Some(Action::Control));
        }
        assert_eq!(
            action(&mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Action::Control)
        );
    }

    #[test]
    fn test_other_inputs() {
        assert_eq!(action(&key(KeyCode::Char('r'))), Some(Action::Reset));
        assert_eq!(action(&key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(action(&key(KeyCode::Char('x'))), None);
        assert_eq!(action(&mouse(MouseEventKind::Down(MouseButton::Right))), None);
        assert_eq!(action(&mouse(MouseEventKind::Moved)), None);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut release = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(action(&Event::Key(release)), None);
    }
}
