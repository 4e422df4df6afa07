use std::sync::Arc;

use async_openai::{Client, config::OpenAIConfig};
use color_eyre::eyre::Result;
use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    agent::{Roster, roster},
    config::GameConfig,
    error::user_visible_error,
    message::{Message, MessageType},
    runner::{self, TurnEvent},
    session::Session,
    tui::{Tui, TuiEvent},
    ui,
};

pub const WELCOME_MESSAGE: &str = "🧙 Welcome, adventurer! Your quest begins now...\n\nTell me what you'd like to do — explore a forest, enter a dungeon, or visit a village?";

pub struct App {
    pub config: GameConfig,
    pub client: Client<OpenAIConfig>,
    pub roster: Roster,
    pub session: Session,
    pub messages: Vec<Message>,
    pub input: String,
    pub scroll_offset: usize,
    pub spinner: ui::Spinner,
    pub running: bool,
    turn_tx: UnboundedSender<TurnEvent>,
    turn_rx: UnboundedReceiver<TurnEvent>,
}

impl App {
    pub fn new(config: GameConfig) -> Self {
        let client = config.client();
        let (turn_tx, turn_rx) = mpsc::unbounded_channel();
        Self {
            config,
            client,
            roster: roster(),
            session: Session::new(),
            messages: vec![Message::new(MessageType::System, WELCOME_MESSAGE)],
            input: String::new(),
            scroll_offset: 0,
            spinner: ui::Spinner::new(),
            running: true,
            turn_tx,
            turn_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        while self.running {
            tokio::select! {
                maybe_event = tui.next() => {
                    let Some(event) = maybe_event else { break };
                    match event {
                        TuiEvent::Key(key) => self.on_key(key),
                        TuiEvent::Mouse(mouse) => self.on_mouse(mouse),
                        TuiEvent::Tick => self.spinner.tick(),
                        TuiEvent::Render => {
                            tui.draw(|f| ui::draw(f, self))?;
                        }
                        TuiEvent::Error => {
                            log::error!("terminal event stream error");
                        }
                        TuiEvent::Init | TuiEvent::Resize(..) => {}
                    }
                }
                Some(event) = self.turn_rx.recv() => {
                    self.on_turn_event(event);
                }
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_add(1),
            KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_add(10),
            KeyCode::PageDown => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(3);
            }
            MouseEventKind::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(3);
            }
            _ => {}
        }
    }

    /// One submission per turn; further input is held until the current turn
    /// settles.
    pub fn submit_input(&mut self) {
        if self.spinner.is_spinning {
            return;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.input.clear();
        self.scroll_offset = 0;

        self.messages.push(Message::new(MessageType::User, text.clone()));
        self.session.push_user(text);
        // Placeholder the streamed deltas append into.
        self.messages.push(Message::new(MessageType::Game, ""));
        self.spinner.start();
        self.spawn_turn();
    }

    fn spawn_turn(&self) {
        let client = self.client.clone();
        let config = self.config.clone();
        let entry = Arc::clone(&self.roster.triage);
        let history = self.session.history().to_vec();
        let tx = self.turn_tx.clone();
        tokio::spawn(async move {
            match runner::run_streamed(&client, &config, entry, &history, &tx).await {
                Ok(text) => {
                    let _ = tx.send(TurnEvent::Completed(text));
                }
                Err(err) => {
                    log::error!("turn failed: {err}");
                    let _ = tx.send(TurnEvent::Failed(err.to_string()));
                }
            }
        });
    }

    pub fn on_turn_event(&mut self, event: TurnEvent) {
        match event {
            TurnEvent::Delta(text) => {
                if let Some(last) = self.messages.last_mut() {
                    last.content.push_str(&text);
                }
            }
            TurnEvent::Completed(text) => {
                self.session.push_assistant(text.clone());
                if let Some(last) = self.messages.last_mut() {
                    last.content = text;
                }
                self.spinner.stop();
            }
            TurnEvent::Failed(err) => {
                // The failed exchange stays out of the session history so the
                // next turn retries from a clean transcript.
                if let Some(last) = self.messages.last_mut() {
                    last.content = user_visible_error(&err);
                    last.message_type = MessageType::System;
                }
                self.spinner.stop();
            }
        }
    }
}
