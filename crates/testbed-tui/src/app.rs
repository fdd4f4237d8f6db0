//! Application state and main event loop.

use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tracing::info;

use testbed_dispatch::{AuditLevel, AuditLog, CallbackReceiver, TaskDispatcher, TestbedHal};

use crate::render;
use crate::state::UiState;

/// Main application with UI state, the callback queue receiver, and the
/// dispatcher handle.
pub struct App {
    /// Current UI state snapshot for rendering.
    state: UiState,

    /// Receiver half of the deferred-callback queue.
    callbacks: CallbackReceiver<UiState>,

    /// Dispatcher for background validations.
    dispatcher: TaskDispatcher<UiState>,

    /// Simulated hardware layer; cloned into each work payload.
    hal: TestbedHal,

    /// Audit trail handle.
    audit: Arc<AuditLog>,
}

impl App {
    /// Create a new application instance.
    pub fn new(
        state: UiState,
        callbacks: CallbackReceiver<UiState>,
        dispatcher: TaskDispatcher<UiState>,
        hal: TestbedHal,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            state,
            callbacks,
            dispatcher,
            hal,
            audit,
        }
    }

    /// Run the main event loop.
    ///
    /// This runs on the main thread and handles:
    /// - Drawing the UI
    /// - Processing keyboard input
    /// - Draining deferred callbacks scheduled by worker threads
    ///
    /// All UI mutation happens here; worker threads only ever reach this
    /// state through the drained callbacks.
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> std::io::Result<()> {
        loop {
            // Draw the UI
            terminal.draw(|frame| render::render(frame, &self.state))?;

            // Poll terminal events (non-blocking with short timeout)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        break; // quit requested
                    }
                }
            }

            // Run deferred callbacks on this thread (non-blocking)
            self.callbacks.drain(&mut self.state);

            if self.state.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle a key press.
    ///
    /// Returns true if the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                return true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return true;
            }

            // Up/Down or j/k navigation
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select_prev();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.select_next();
            }

            // Validate the selected component
            KeyCode::Enter | KeyCode::Char('v') => {
                if let Some(component) = self.state.selected_component().map(str::to_owned) {
                    self.start_validation(&component);
                }
            }

            // Validate every component
            KeyCode::Char('a') => {
                for component in self.state.component_names() {
                    self.start_validation(&component);
                }
            }

            _ => {}
        }
        false
    }

    /// Kick off a non-blocking validation sequence for one component.
    fn start_validation(&mut self, component: &str) {
        info!(component = %component, "Validation requested");
        self.audit.record(
            AuditLevel::Info,
            &format!("MANUAL_VALIDATION: {component} triggered"),
        );

        self.state.mark_validating(component);
        self.state.status_message = format!("Validating {component}...");

        let hal = self.hal.clone();
        let target = component.to_owned();
        let row = component.to_owned();
        self.dispatcher.submit(
            component,
            move || hal.validate(&target),
            move |outcome, state: &mut UiState| {
                state.apply_outcome(&row, &outcome);
            },
        );
    }
}
