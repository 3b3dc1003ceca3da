//! Simulator main loop

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use arplace::placement::PlacementSettings;
use arplace::{ArPlaceConfig, FrameLoop, Notice, RenderBackend, SessionLifecycle, SessionState};
use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::cli::Cli;
use crate::hud::Hud;
use crate::input::{InputSimulator, SimCommand};
use crate::sim::{SimFrame, SimLoader, SimPlatform, SimWorld};
use crate::terminal::TerminalBackend;

/// Spacing of the passthrough grid drawn on room surfaces, in meters
const BACKDROP_SPACING: f32 = 0.5;

/// Drives the placement pipeline from keyboard input at a fixed tick rate
pub struct SimRunner<W: Write = Stdout> {
    frame_loop: FrameLoop<TerminalBackend<W>>,
    platform: SimPlatform,
    world: SimWorld,
    input: InputSimulator,
    hud: Hud,
    tick_rate: Duration,
    running: bool,
}

impl<W: Write> SimRunner<W> {
    pub fn new(cli: &Cli, config: &ArPlaceConfig, mut backend: TerminalBackend<W>) -> Self {
        let platform = SimPlatform::new()
            .with_hit_test(!cli.no_hit_test)
            .with_availability(!cli.no_ar);
        let lifecycle = SessionLifecycle::new(
            Box::new(platform.clone()),
            Box::new(SimLoader::new(cli.load_delay())),
            config.session.clone(),
            PlacementSettings::from_config(config),
        );

        let world = SimWorld::room();
        backend.set_backdrop(world.backdrop(BACKDROP_SPACING));

        Self {
            frame_loop: FrameLoop::new(lifecycle, backend),
            platform,
            world,
            input: InputSimulator::new(),
            hud: Hud::new(),
            tick_rate: cli.tick_rate(),
            running: true,
        }
    }

    pub fn frame_loop(&self) -> &FrameLoop<TerminalBackend<W>> {
        &self.frame_loop
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn platform(&self) -> &SimPlatform {
        &self.platform
    }

    pub fn handle_command(&mut self, command: SimCommand) {
        tracing::debug!(?command, "input");
        match command {
            SimCommand::Look => {}
            SimCommand::Select => self.frame_loop.select(),
            SimCommand::EnterAr => self.frame_loop.start(),
            SimCommand::ExitAr => self.frame_loop.exit(),
            SimCommand::PlatformEnd => {
                if !self.platform.end_active_session() {
                    self.hud.push(Notice::info("No AR session is running"));
                }
            }
            SimCommand::Reset => {
                self.frame_loop.reset();
                self.input.reset();
                self.hud.push(Notice::info("Reset"));
            }
            SimCommand::ToggleWireframe => {
                let wireframe = !self.frame_loop.lifecycle().settings().wireframe();
                self.frame_loop.set_wireframe(wireframe);
            }
            SimCommand::PickModel(index) => {
                let name = self
                    .frame_loop
                    .lifecycle()
                    .settings()
                    .catalog()
                    .get(index)
                    .map(|entry| entry.name.clone());
                match name {
                    Some(name) => {
                        self.frame_loop.lifecycle_mut().select_model(&name);
                    }
                    None => self
                        .hud
                        .push(Notice::info(format!("No model in slot {}", index + 1))),
                }
            }
        }
    }

    /// The surface changed size; the canvas follows even without a session
    pub fn resize(&mut self, width: u16, height: u16) {
        let (width, height) = (width as u32, height as u32);
        if self.frame_loop.lifecycle().state() == SessionState::Idle {
            self.frame_loop.backend_mut().resize(width, height);
        } else {
            self.frame_loop.resize(width, height);
        }
    }

    /// One display refresh
    pub fn tick(&mut self) -> io::Result<()> {
        self.frame_loop.pump();
        for notice in self.frame_loop.lifecycle_mut().drain_notices() {
            tracing::info!(kind = ?notice.kind, "{}", notice.message);
            self.hud.push(notice);
        }

        let width = self.frame_loop.backend().canvas().width() as u16;
        let (header, footer) = self.hud.lines(self.frame_loop.lifecycle(), width);
        self.frame_loop.backend_mut().set_overlay(header, footer);

        let frame = SimFrame::new(&self.world, self.input.head_transform());
        if !self.frame_loop.on_frame(&frame) {
            self.frame_loop.backend_mut().present_idle()?;
        }

        self.hud.tick();
        Ok(())
    }
}

impl SimRunner<Stdout> {
    /// Run until Ctrl-Q
    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        let result = self.event_loop();

        self.frame_loop.exit();
        terminal::disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;

        let stats = self.frame_loop.stats();
        tracing::info!(
            ticks = stats.ticks,
            rendered = stats.rendered,
            absorbed = stats.absorbed,
            "simulator stopped"
        );
        result
    }

    fn event_loop(&mut self) -> io::Result<()> {
        let mut last_tick = Instant::now();

        while self.running {
            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_default();

            if event::poll(timeout)? {
                match event::read()? {
                    CrosstermEvent::Key(key) => {
                        let quit = key.code == KeyCode::Char('q')
                            && key.modifiers.contains(KeyModifiers::CONTROL);
                        if quit {
                            self.running = false;
                            continue;
                        }
                        if let Some(command) = self.input.process_key(key) {
                            self.handle_command(command);
                        }
                    }
                    CrosstermEvent::Resize(width, height) => self.resize(width, height),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.tick()?;
                last_tick = Instant::now();
            }
        }
        Ok(())
    }
}
