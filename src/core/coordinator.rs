//! Focus/edit coordination and suggestion scheduling

use super::debounce::DebounceScheduler;
use super::session::{CoordinatorStats, FocusSession, PendingRequest, SessionSnapshot, Suggestion};
use crate::config::CoordinatorConfig;
use crate::llm::{LlmError, SuggestionBackend, SuggestionRequest};
use crate::overlay::OverlayPort;
use crate::platform::{
    FallbackInjector, FieldId, FieldRef, FieldRole, FocusNotification, PlatformError, TextChangeNotification,
};
use crate::utils::errors::AutocompleteError;
use crate::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Everything the coordinator reacts to. Adapter notifications and the
/// completions of its own timers and backend calls all arrive here, so state
/// is only ever touched from the event loop.
pub enum CoordinatorEvent {
    Focus(FocusNotification),
    TextChanged(TextChangeNotification),
    Accept(String),
    DebounceElapsed {
        ticket: u64,
    },
    SuggestionReady {
        generation: u64,
        field: FieldId,
        outcome: std::result::Result<String, LlmError>,
    },
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Cloneable handle given to platform adapters and the overlay
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<CoordinatorEvent>,
}

impl CoordinatorHandle {
    /// Forward a focus notification
    pub fn on_focus_event(&self, notification: FocusNotification) -> Result<()> {
        self.send(CoordinatorEvent::Focus(notification))
    }

    /// Forward a text-change notification
    pub fn on_text_change_event(&self, notification: TextChangeNotification) -> Result<()> {
        self.send(CoordinatorEvent::TextChanged(notification))
    }

    /// Accept the suggestion text exactly as the overlay displayed it
    pub fn accept_suggestion<S: Into<String>>(&self, suggestion: S) -> Result<()> {
        self.send(CoordinatorEvent::Accept(suggestion.into()))
    }

    /// Current coordinator state, taken after all previously sent events
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, receiver) = oneshot::channel();
        self.send(CoordinatorEvent::Snapshot(reply))?;
        receiver
            .await
            .map_err(|_| AutocompleteError::coordinator("Coordinator stopped before answering"))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn send(&self, event: CoordinatorEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|_| AutocompleteError::coordinator("Coordinator has shut down"))
    }
}

/// Collaborators the coordinator drives
#[derive(Clone)]
pub struct Collaborators {
    pub backend: Arc<dyn SuggestionBackend>,
    pub overlay: Arc<dyn OverlayPort>,
    pub injector: Arc<dyn FallbackInjector>,
}

/// Tracks the focused field, debounces edits, requests suggestions and
/// merges accepted ones back into the field.
pub struct AutocompleteCoordinator {
    config: CoordinatorConfig,
    collaborators: Collaborators,
    session: Option<FocusSession>,
    pending: Option<PendingRequest>,
    displayed: Option<Suggestion>,
    generation: u64,
    debounce: DebounceScheduler,
    stats: CoordinatorStats,
    // Weak so the loop ends once every external handle is dropped
    events: mpsc::WeakUnboundedSender<CoordinatorEvent>,
}

impl AutocompleteCoordinator {
    /// Start the coordinator's event loop on the current runtime.
    ///
    /// The loop stops when `shutdown` is cancelled or every handle is dropped.
    pub fn spawn(
        config: CoordinatorConfig,
        collaborators: Collaborators,
        shutdown: CancellationToken,
    ) -> (CoordinatorHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let coordinator = Self {
            config,
            collaborators,
            session: None,
            pending: None,
            displayed: None,
            generation: 0,
            debounce: DebounceScheduler::new(),
            stats: CoordinatorStats::default(),
            events: sender.downgrade(),
        };

        let task = tokio::spawn(coordinator.run(receiver, shutdown));
        (CoordinatorHandle { sender }, task)
    }

    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<CoordinatorEvent>, shutdown: CancellationToken) {
        info!(
            "Coordinator started (debounce {:?}, merge policy {:?})",
            self.config.debounce_delay(),
            self.config.merge_policy
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = receiver.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
            }
        }

        self.debounce.cancel();
        info!(
            "Coordinator stopped after {} requests, {} suggestions shown",
            self.stats.requests_issued, self.stats.suggestions_shown
        );
    }

    fn handle_event(&mut self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::Focus(notification) => self.on_focus_event(notification),
            CoordinatorEvent::TextChanged(notification) => self.on_text_change_event(notification),
            CoordinatorEvent::Accept(suggestion) => self.accept_suggestion(suggestion),
            CoordinatorEvent::DebounceElapsed { ticket } => self.on_debounce_elapsed(ticket),
            CoordinatorEvent::SuggestionReady {
                generation,
                field,
                outcome,
            } => self.on_suggestion_ready(generation, field, outcome),
            CoordinatorEvent::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn on_focus_event(&mut self, notification: FocusNotification) {
        match notification {
            FocusNotification::Gained { field, role_hint } => {
                let id = field.id();
                match self.classify(&field, role_hint) {
                    Ok(FieldRole::Text) => match field.read_text() {
                        Ok(text) => self.begin_session(field, text),
                        Err(e) => {
                            warn!("Could not read text of {}: {}; treating as non-editable", id, e);
                            self.end_session();
                            self.hide_overlay();
                        }
                    },
                    Ok(role) => {
                        debug!("Focus moved to {} ({:?}); not tracking", id, role);
                        self.end_session();
                        self.hide_overlay();
                    }
                    Err(e) => {
                        warn!("Could not classify {}: {}; treating as non-editable", id, e);
                        self.end_session();
                        self.hide_overlay();
                    }
                }
            }
            FocusNotification::Lost { field } => {
                if self.tracked_field() == Some(field) {
                    info!("Focus left {}", field);
                    self.end_session();
                    self.hide_overlay();
                } else {
                    debug!("Ignoring focus-lost for untracked {}", field);
                }
            }
        }
    }

    fn classify(&self, field: &FieldRef, role_hint: Option<FieldRole>) -> std::result::Result<FieldRole, PlatformError> {
        let role = match role_hint {
            Some(role) => role,
            None => field.role()?,
        };

        Ok(match role {
            FieldRole::Protected if !self.config.exclude_protected => FieldRole::Text,
            role => role,
        })
    }

    fn begin_session(&mut self, field: FieldRef, text: String) {
        self.debounce.cancel();
        self.pending = None;
        self.generation += 1;
        info!("Tracking {} (generation {})", field.id(), self.generation);
        self.session = Some(FocusSession::new(field, text));

        // A pre-filled field gets a suggestion without waiting for an edit
        self.request_suggestion();
    }

    fn end_session(&mut self) {
        self.debounce.cancel();
        self.pending = None;
        self.session = None;
    }

    fn tracked_field(&self) -> Option<FieldId> {
        self.session.as_ref().map(FocusSession::field_id)
    }

    fn on_text_change_event(&mut self, notification: TextChangeNotification) {
        let Some(session) = self.session.as_mut() else {
            debug!("Ignoring {:?} with no tracked field", notification.kind);
            return;
        };
        if session.field.id() != notification.source {
            debug!("Ignoring {:?} from untracked {}", notification.kind, notification.source);
            return;
        }

        match session.field.read_text() {
            Ok(text) => {
                session.cached_text = text;
                session.cache_stale = false;
            }
            Err(e) => {
                warn!("Could not read text of {} after edit: {}", notification.source, e);
                return;
            }
        }

        let events = self.events.clone();
        let ticket = self.debounce.arm(self.config.debounce_delay(), move |ticket| {
            if let Some(sender) = events.upgrade() {
                let _ = sender.send(CoordinatorEvent::DebounceElapsed { ticket });
            }
        });
        self.pending = Some(PendingRequest {
            ticket,
            armed_at: self.debounce.armed_at().unwrap_or_else(Instant::now),
            generation: self.generation,
        });
    }

    fn on_debounce_elapsed(&mut self, ticket: u64) {
        if !self.debounce.take_if_due(ticket) {
            debug!("Ignoring superseded debounce timer {}", ticket);
            return;
        }

        match self.pending.take() {
            Some(pending) if pending.ticket == ticket && pending.generation == self.generation => {
                self.request_suggestion();
            }
            _ => debug!("Debounce timer {} no longer has a pending request", ticket),
        }
    }

    fn request_suggestion(&mut self) {
        let Some(session) = self.session.as_mut() else {
            debug!("No tracked field; skipping suggestion request");
            return;
        };
        refresh_if_stale(session);

        let Some(sender) = self.events.upgrade() else {
            return;
        };

        let generation = self.generation;
        let field = session.field.id();
        let mut request = SuggestionRequest::new(session.cached_text.clone());
        if let Some(label) = session.field.context_label() {
            request = request.with_context(label);
        }

        self.stats.requests_issued += 1;
        debug!(
            "Requesting suggestion for {} ({} chars, generation {})",
            field,
            request.text.len(),
            generation
        );

        let backend = self.collaborators.backend.clone();
        tokio::spawn(async move {
            let outcome = backend.request_suggestion(&request).await;
            let _ = sender.send(CoordinatorEvent::SuggestionReady {
                generation,
                field,
                outcome,
            });
        });
    }

    fn on_suggestion_ready(
        &mut self,
        generation: u64,
        field: FieldId,
        outcome: std::result::Result<String, LlmError>,
    ) {
        let current_generation = self.generation;
        let Some(session) = self
            .session
            .as_ref()
            .filter(|session| generation == current_generation && session.field.id() == field)
        else {
            self.stats.stale_discarded += 1;
            debug!("Discarding stale suggestion for {} (generation {})", field, generation);
            return;
        };

        match outcome {
            Ok(text) if !text.is_empty() => match session.field.bounding_box() {
                Ok(bounds) => {
                    let (x, y) = bounds.anchor();
                    self.collaborators.overlay.show(&text, x, y);
                    self.stats.suggestions_shown += 1;
                    self.displayed = Some(Suggestion { text, generation });
                }
                Err(e) => {
                    warn!("Could not locate {} on screen: {}", field, e);
                    self.hide_overlay();
                }
            },
            Ok(_) => {
                debug!("Backend had no suggestion for {}", field);
                self.hide_overlay();
            }
            Err(e) => {
                error!("Suggestion request failed: {}", e);
                self.hide_overlay();
            }
        }
    }

    fn accept_suggestion(&mut self, suggestion: String) {
        let Some(session) = self.session.as_mut() else {
            debug!("Ignoring accept with no tracked field");
            return;
        };
        refresh_if_stale(session);

        // The overlay hides itself as part of accepting
        self.displayed = None;

        let merged = self.config.merge_policy.merge(&session.cached_text, &suggestion);
        match session.field.set_text(&merged) {
            Ok(true) => {
                info!("Wrote accepted suggestion into {}", session.field.id());
                session.cached_text = merged;
                session.cache_stale = false;
                self.stats.direct_writes += 1;
                return;
            }
            Ok(false) => info!("{} declined a direct write; using paste fallback", session.field.id()),
            Err(e) => warn!("Direct write into {} failed: {}; using paste fallback", session.field.id(), e),
        }

        session.cache_stale = true;
        self.stats.fallback_injections += 1;

        let injector = self.collaborators.injector.clone();
        tokio::spawn(async move {
            if !injector.is_available().await {
                warn!("No paste fallback available; accepted suggestion was not inserted");
                return;
            }
            if let Err(e) = injector.inject(&merged).await {
                warn!("Paste fallback failed ({}): {}", e.category(), e);
            }
        });
    }

    fn hide_overlay(&mut self) {
        self.displayed = None;
        self.collaborators.overlay.hide();
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            field: self.tracked_field(),
            cached_text: self.session.as_ref().map(|s| s.cached_text.clone()),
            cache_stale: self.session.as_ref().map(|s| s.cache_stale).unwrap_or(false),
            generation: self.generation,
            pending: self.pending,
            debounce_armed: self.debounce.is_armed(),
            displayed: self.displayed.clone(),
            stats: self.stats,
        }
    }
}

/// Re-read the field when the cache no longer reflects it
fn refresh_if_stale(session: &mut FocusSession) {
    if !session.cache_stale {
        return;
    }
    match session.field.read_text() {
        Ok(text) => {
            session.cached_text = text;
            session.cache_stale = false;
        }
        Err(e) => debug!("Could not refresh stale cache for {}: {}", session.field.id(), e),
    }
}
