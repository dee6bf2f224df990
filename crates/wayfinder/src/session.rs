//! The search session: one event loop that owns all search and map state.
//!
//! Frontends talk to a running [`SearchSession`] through a cloneable
//! [`SearchHandle`]: they push user intents (keystrokes, focus, selection,
//! clear) and observe [`SessionSnapshot`]s. Internally the loop drives the
//! [`SearchMachine`], arms the [`Debouncer`] with a task that fires the timer
//! and runs the geocode call, and forwards selections to the
//! [`MapNavigator`]. All mutation happens on the loop, so nothing is locked.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument};
use wayfinder_providers::{CandidateId, CandidateLocation, GeocodeError, Geocoder};

use crate::{
    config::SessionConfig,
    error::{Result, WayfinderError},
    map::{CameraTarget, MapNavigator, MapSurface, SelectedLocation},
    search::{Debouncer, InputEffect, RequestSeq, Resolution, SearchMachine, SearchSnapshot},
};

/// User intents accepted by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// The query text changed to this value.
    Input(String),
    /// The search input gained focus.
    Focus,
    /// The results panel was closed without a selection.
    Dismiss,
    /// A candidate in the results panel was picked.
    Select(CandidateId),
    /// The clear button was pressed.
    Clear,
    Shutdown,
}

enum SessionEvent {
    TimerFired(RequestSeq),
    Resolved(RequestSeq, std::result::Result<Vec<CandidateLocation>, GeocodeError>),
}

/// Everything a frontend needs to render the search box and the map overlay.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionSnapshot {
    pub search: SearchSnapshot,
    pub camera: CameraTarget,
    pub selected: Option<SelectedLocation>,
}

/// Cloneable front door to a running [`SearchSession`].
///
/// The session shuts down once [`SearchHandle::shutdown`] is called or every
/// handle has been dropped.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SearchHandle {
    /// Queue a command. Fails once the session has shut down.
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| WayfinderError::SessionClosed)
    }

    pub fn input(&self, text: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::Input(text.into()))
    }

    pub fn focus(&self) -> Result<()> {
        self.send(SessionCommand::Focus)
    }

    pub fn dismiss(&self) -> Result<()> {
        self.send(SessionCommand::Dismiss)
    }

    pub fn select(&self, id: impl Into<CandidateId>) -> Result<()> {
        self.send(SessionCommand::Select(id.into()))
    }

    pub fn clear(&self) -> Result<()> {
        self.send(SessionCommand::Clear)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown)
    }

    /// The most recently published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Wait until a published snapshot satisfies `predicate` and return it.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot> {
        let mut rx = self.snapshot.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .map_err(|_| WayfinderError::SessionClosed)?;
        Ok(snapshot.clone())
    }
}

pub struct SearchSession<G: Geocoder, S: MapSurface> {
    geocoder: Arc<G>,
    machine: SearchMachine,
    debouncer: Debouncer,
    navigator: MapNavigator<S>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    snapshot: watch::Sender<SessionSnapshot>,
}

#[cfg(feature = "http")]
impl<S: MapSurface> SearchSession<wayfinder_providers::GeocodeClient, S> {
    /// Session backed by the HTTP geocoder described by `geocode`.
    pub fn with_client(
        geocode: wayfinder_providers::GeocodeConfig,
        surface: S,
        config: &SessionConfig,
    ) -> Result<(Self, SearchHandle)> {
        let client = wayfinder_providers::GeocodeClient::new(geocode)?;
        Ok(Self::new(client, surface, config))
    }
}

impl<G: Geocoder, S: MapSurface> SearchSession<G, S> {
    pub fn new(geocoder: G, surface: S, config: &SessionConfig) -> (Self, SearchHandle) {
        let navigator = MapNavigator::new(surface, config.default_camera)
            .with_target_zoom(config.target_zoom)
            .with_fly_duration(config.fly_duration);
        let machine = SearchMachine::new();

        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let (snapshot, snapshot_rx) = watch::channel(SessionSnapshot {
            search: machine.snapshot(),
            camera: navigator.camera(),
            selected: None,
        });

        let session = Self {
            geocoder: Arc::new(geocoder),
            machine,
            debouncer: Debouncer::new(config.debounce),
            navigator,
            commands,
            events_tx,
            events,
            snapshot,
        };
        let handle = SearchHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
        };
        (session, handle)
    }

    /// Run until shut down, then hand back the navigator (and with it the map
    /// surface). Pending timers and in-flight calls are cancelled on exit.
    #[instrument(name = "Search session", skip_all, level = "info")]
    pub async fn run(mut self) -> MapNavigator<S> {
        info!(debounce = ?self.debouncer.delay(), "Search session started");
        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.on_command(command),
                },
                Some(event) = self.events.recv() => self.on_event(event),
            }
            self.publish();
        }

        self.debouncer.cancel();
        info!("Search session shut down");
        self.navigator
    }

    fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Input(text) => match self.machine.input(text) {
                InputEffect::Schedule { seq, query } => self.schedule_search(seq, query),
                InputEffect::Cleared => {
                    self.debouncer.cancel();
                }
                InputEffect::Unchanged => {}
            },
            SessionCommand::Focus => {
                self.machine.focus();
            }
            SessionCommand::Dismiss => {
                self.machine.dismiss();
            }
            SessionCommand::Select(id) => {
                if let Some(candidate) = self.machine.select(&id) {
                    self.debouncer.cancel();
                    self.navigator.select_location(&candidate);
                }
            }
            SessionCommand::Clear => {
                self.debouncer.cancel();
                self.machine.clear();
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn on_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TimerFired(seq) => {
                if self.machine.begin_loading(seq) {
                    debug!(%seq, query = self.machine.query(), "Debounce elapsed, geocoding");
                }
            }
            SessionEvent::Resolved(seq, outcome) => match self.machine.resolve(seq, outcome) {
                Resolution::Applied { count } => debug!(%seq, count, "Applied geocode results"),
                Resolution::Failed | Resolution::Stale => {}
            },
        }
    }

    fn schedule_search(&mut self, seq: RequestSeq, query: String) {
        let geocoder = Arc::clone(&self.geocoder);
        let events = self.events_tx.clone();
        debug!(%seq, query = %query, "Arming debounced search");

        self.debouncer.arm(async move {
            if events.send(SessionEvent::TimerFired(seq)).is_err() {
                return;
            }
            let outcome = geocoder.search(&query).await;
            // The session may be gone by now; nothing to report to.
            let _ = events.send(SessionEvent::Resolved(seq, outcome));
        });
    }

    fn current_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            search: self.machine.snapshot(),
            camera: self.navigator.camera(),
            selected: self.navigator.selected().cloned(),
        }
    }

    fn publish(&self) {
        let next = self.current_snapshot();
        self.snapshot.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
