//! Terminal balloon runner (default binary).
//!
//! Keyboard play through crossterm, a framebuffer-diffing renderer, and an
//! optional TCP adapter for external controllers. Both input sources feed the
//! same session; a resolved turn keeps the session busy until its flash has
//! been shown.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use balloon_match::adapter::{
    apply_client_command, build_observation, Adapter, ClientCommand, GameInfo, InboundCommand,
    InboundPayload, OutboundMessage,
};
use balloon_match::core::{time_seed, GameSnapshot, GameState, SessionConfig, TurnEvent};
use balloon_match::engine::hint;
use balloon_match::input::{handle_key_event, should_quit, InputHandler, UiCommand};
use balloon_match::store::{balance, credit, JsonFileStore};
use balloon_match::term::{
    preview_swap, AdapterStatusView, FrameBuffer, GameView, Overlay, TerminalRenderer, Viewport,
};
use balloon_match::types::{InputEvent, Position};

const FRAME_MS: u64 = 33;
const FLASH_MS: u64 = 250;

/// A resolved turn on screen, waiting for `commit`.
struct Flash {
    shown: GameSnapshot,
    cells: Vec<Position>,
    until: Instant,
}

impl Flash {
    /// Show the pre-turn board (with the swap applied) and light the first wave.
    fn start(before: GameSnapshot, swapped: Option<(Position, Position)>, event: &TurnEvent) -> Self {
        let shown = match swapped {
            Some((a, b)) => preview_swap(&before, a, b),
            None => before,
        };
        Self {
            shown,
            cells: event.removed.first().map(|w| w.to_vec()).unwrap_or_default(),
            until: Instant::now() + Duration::from_millis(FLASH_MS),
        }
    }
}

struct App {
    game: GameState,
    handler: InputHandler,
    overlay: Overlay,
    flash: Option<Flash>,
    store: Option<JsonFileStore>,
    credited_episode: Option<u32>,
    adapter: Option<Adapter>,
    obs_seq: u64,
}

fn main() -> Result<()> {
    init_logging()?;

    let config = SessionConfig::from_env();
    log::info!(
        "starting {} mode {}x{} seed {}",
        config.engine.mode.as_str(),
        config.rows,
        config.cols,
        config.seed
    );

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging() -> Result<()> {
    use env_logger::{Builder, Env, Target};

    // Raw mode owns the terminal, so logs only go to a file.
    match std::env::var("BALLOON_LOG_PATH") {
        Ok(path) if !path.trim().is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path.trim())?;
            Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        _ => Builder::from_env(Env::default().default_filter_or("off")).init(),
    }
    Ok(())
}

fn open_store() -> Option<JsonFileStore> {
    let path = std::env::var("BALLOON_STORE_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "balloon-store.json".to_string());
    match JsonFileStore::open(&path) {
        Ok(store) => Some(store),
        Err(e) => {
            log::warn!("store {} unavailable ({}): {}", path, e.code(), e);
            None
        }
    }
}

fn run(term: &mut TerminalRenderer, config: SessionConfig) -> Result<()> {
    let game = GameState::new(config);
    let adapter = Adapter::start_from_env(GameInfo {
        mode: game.mode(),
        rows: game.grid().rows(),
        cols: game.grid().cols(),
    })?;
    let handler = InputHandler::new(game.mode(), game.grid().rows(), game.grid().cols());

    let mut app = App {
        game,
        handler,
        overlay: Overlay::default(),
        flash: None,
        store: open_store(),
        credited_episode: None,
        adapter,
        obs_seq: 0,
    };
    app.overlay.balance = app.store.as_ref().and_then(|s| balance(s).ok());

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let frame = Duration::from_millis(FRAME_MS);

    loop {
        app.settle_flash();
        app.drain_adapter();

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let status = app.adapter.as_ref().map(|a| {
            let s = a.status();
            AdapterStatusView {
                enabled: true,
                client_count: s.client_count,
                controller_id: s.controller_id,
                streaming_count: s.streaming_count,
            }
        });
        app.overlay.cursor = Some(app.handler.cursor());
        app.overlay.grabbed = app.handler.grabbed();
        let live;
        let (snap, overlay) = match &app.flash {
            Some(flash) => {
                let overlay = Overlay {
                    flash: flash.cells.clone(),
                    ..app.overlay.clone()
                };
                (&flash.shown, overlay)
            }
            None => {
                live = app.game.snapshot();
                (&live, app.overlay.clone())
            }
        };
        view.render_into(snap, &overlay, status.as_ref(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        if !event::poll(frame)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    app.credit_session();
                    return Ok(());
                }
                if let Some(cmd) = handle_key_event(key) {
                    app.on_command(cmd);
                }
            }
            Event::Resize(..) => term.invalidate(),
            _ => {}
        }
    }
}

impl App {
    fn on_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::Restart => {
                self.credit_session();
                self.flash = None;
                self.game.restart_seeded(time_seed());
                self.handler.reset();
                self.overlay.hint = None;
                self.broadcast();
            }
            UiCommand::Hint => {
                let at = hint(self.game.grid(), self.game.mode()).map(|event| match event {
                    InputEvent::Swap { from, .. } => from,
                    InputEvent::Tap { at } => at,
                });
                if let Some(pos) = at {
                    self.handler.set_cursor(pos);
                }
                self.overlay.hint = at;
            }
            _ => {
                if let Some(input) = self.handler.handle(cmd) {
                    self.play(input);
                }
            }
        }
    }

    fn play(&mut self, input: InputEvent) {
        let before = self.game.snapshot();
        match self.game.apply(input) {
            Ok(event) if event.is_resolved() => {
                self.handler.follow(input);
                self.overlay.hint = None;
                let swapped = self.game.last_turn().and_then(|t| t.swapped);
                self.flash = Some(Flash::start(before, swapped, &event));
            }
            Ok(event) => log::debug!("rejected {:?}: {:?}", input, event.rejected),
            Err(e) => log::debug!("refused {:?}: {}", input, e),
        }
    }

    /// Commit the turn once its flash has been on screen long enough.
    fn settle_flash(&mut self) {
        if self.flash.as_ref().is_some_and(|f| Instant::now() < f.until) {
            return;
        }
        if self.flash.take().is_none() {
            return;
        }
        self.game.commit();
        if self.game.game_over() {
            self.credit_session();
        }
        self.broadcast();
    }

    fn drain_adapter(&mut self) {
        // Queued commands wait while a turn is on screen.
        while self.flash.is_none() {
            let Some(InboundCommand {
                client_id,
                seq,
                payload,
            }) = self.adapter.as_mut().and_then(Adapter::try_recv)
            else {
                return;
            };
            match payload {
                InboundPayload::SnapshotRequest => {
                    let obs = build_observation(&self.game.snapshot(), seq);
                    self.send(OutboundMessage::ToClientObservation { client_id, obs });
                }
                InboundPayload::Command(command) => {
                    if command == ClientCommand::Restart {
                        self.credit_session();
                    }
                    let before = self.game.snapshot();
                    match apply_client_command(&mut self.game, seq, &command) {
                        Ok(applied) => {
                            self.send(OutboundMessage::ToClientAck {
                                client_id,
                                ack: applied.ack,
                            });
                            match applied.event {
                                Some(event) => {
                                    let swapped = self.game.last_turn().and_then(|t| t.swapped);
                                    self.flash = Some(Flash::start(before, swapped, &event));
                                }
                                None => {
                                    self.handler.reset();
                                    self.broadcast();
                                }
                            }
                        }
                        Err(err) => self.send(OutboundMessage::ToClientError { client_id, err }),
                    }
                }
            }
        }
    }

    fn broadcast(&mut self) {
        if self.adapter.is_none() {
            return;
        }
        self.obs_seq += 1;
        let obs = build_observation(&self.game.snapshot(), self.obs_seq);
        self.send(OutboundMessage::BroadcastObservation { obs });
    }

    fn send(&self, msg: OutboundMessage) {
        if let Some(adapter) = &self.adapter {
            adapter.send(msg);
        }
    }

    /// Hand the session score to the store, once per episode.
    fn credit_session(&mut self) {
        let episode = self.game.episode_id();
        let score = self.game.score();
        if score == 0 || self.credited_episode == Some(episode) {
            return;
        }
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match credit(store, score as u64) {
            Ok(total) => {
                self.credited_episode = Some(episode);
                self.overlay.balance = Some(total);
            }
            Err(e) => log::warn!("could not credit score {}: {}", score, e),
        }
    }
}
