//! The Scene Generation Orchestrator.
//!
//! One storyboard request runs `Idle -> StructureRequested -> Rendering ->
//! Done`, or back to `Idle` if the structure call fails. Each slot is
//! rendered by its own spawned task; every task reports back through
//! [`Orchestrator::update`], the single entry point that mutates the board.

use std::sync::{Arc, Mutex, PoisonError};

use storyboard_core::command::Command;
use storyboard_core::error::GenerationError;
use storyboard_core::service::GenerationService;
use storyboard_core::story::{RenderSettings, TitleData};
use storyboard_credentials::CredentialGate;
use storyboard_history::{HistoryStore, MediaType};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

use crate::domain::board::{RenderTicket, SceneBoard};
use crate::domain::commands::{GenerateStoryboard, RegenerateScene, RegenerateTitles};
use crate::domain::scene::SlotError;

/// Result of [`Orchestrator::generate_storyboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryboardOutcome {
    /// No credential is active; the credential surface was opened.
    CredentialRequired,
    /// The topic was blank; nothing happened.
    EmptyTopic,
    /// The structure call failed; the board is left empty.
    StructureFailed(GenerationError),
    /// A newer request started while the structure call was outstanding.
    Superseded,
    /// Slots were created and one render task launched per slot.
    Launched {
        /// Request generation.
        generation: u64,
        /// Number of slots and launched tasks.
        scene_count: usize,
    },
}

/// How one render task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The slot now shows this artifact.
    Rendered(String),
    /// The slot was marked failed.
    Failed(GenerationError),
    /// The slot had been reset or re-rendered meanwhile; the result was
    /// dropped (a successful artifact is still recorded in history).
    Superseded,
}

/// Result of [`Orchestrator::regenerate_scene`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegenerateOutcome {
    /// No credential is active; the credential surface was opened.
    CredentialRequired,
    /// No slot exists at the requested position.
    NoSuchSlot,
    /// The re-render ran.
    Finished(SlotOutcome),
}

/// Result of [`Orchestrator::regenerate_titles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitlesOutcome {
    /// The published titles were replaced.
    Replaced(Vec<TitleData>),
    /// The call failed; the previous titles remain.
    Failed(GenerationError),
    /// A newer storyboard request started meanwhile; the titles were dropped.
    Superseded,
}

#[derive(Debug, Clone, Default)]
struct RenderOptions {
    settings: RenderSettings,
    reference_image: Option<String>,
}

struct Inner {
    service: Arc<dyn GenerationService>,
    gate: Arc<CredentialGate>,
    history: HistoryStore,
    board: watch::Sender<SceneBoard>,
    options: Mutex<RenderOptions>,
}

/// Coordinates structure generation, concurrent scene renders, single-scene
/// re-renders and title regeneration against one shared board.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    /// Creates an orchestrator with an empty board.
    #[must_use]
    pub fn new(
        service: Arc<dyn GenerationService>,
        gate: Arc<CredentialGate>,
        history: HistoryStore,
        settings: RenderSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                gate,
                history,
                board: watch::Sender::new(SceneBoard::default()),
                options: Mutex::new(RenderOptions {
                    settings,
                    reference_image: None,
                }),
            }),
        }
    }

    /// Generates a storyboard for `command.topic`.
    ///
    /// Returns once the structure call has settled and, on success, one
    /// render task per slot has been launched. Render tasks run on; observe
    /// them through [`Orchestrator::subscribe`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[instrument(skip(self, command), fields(correlation_id = %command.correlation_id(), command_type = command.command_type()))]
    pub async fn generate_storyboard(&self, command: &GenerateStoryboard) -> StoryboardOutcome {
        if !self.inner.gate.ensure_active() {
            return StoryboardOutcome::CredentialRequired;
        }
        let topic = command.topic.trim();
        if topic.is_empty() {
            return StoryboardOutcome::EmptyTopic;
        }

        let generation = self.update(|board| Some(board.begin_request())).unwrap_or_default();
        let options = self.with_options(|options| {
            options.reference_image.clone_from(&command.reference_image);
            options.clone()
        });
        info!(generation, scene_count = command.scene_count, "requesting story structure");

        let story = match self
            .inner
            .service
            .generate_story_structure(topic, options.reference_image.as_deref(), command.scene_count)
            .await
        {
            Ok(story) => story,
            Err(e) => {
                error!(generation, error = %e, "story structure generation failed");
                if e.is_authorization_failure() {
                    self.inner.gate.mark_failed().await;
                }
                self.update(|board| board.fail_structure(generation).then_some(()));
                return StoryboardOutcome::StructureFailed(e);
            }
        };

        let Some(launches) = self.update(|board| board.initialize(generation, &story)) else {
            warn!(generation, "story structure arrived after a newer request; dropped");
            return StoryboardOutcome::Superseded;
        };

        let scene_count = launches.len();
        info!(generation, scene_count, "story structure ready; rendering scenes");
        for (ticket, prompt) in launches {
            self.spawn_render(ticket, prompt, options.clone(), SlotError::RenderFailed);
        }

        StoryboardOutcome::Launched {
            generation,
            scene_count,
        }
    }

    /// Re-renders the slot at `command.index` with `command.prompt`, leaving
    /// every other slot untouched, and waits for the render to settle. The
    /// render keeps running if the returned future is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[instrument(skip(self, command), fields(correlation_id = %command.correlation_id(), index = command.index))]
    pub async fn regenerate_scene(&self, command: &RegenerateScene) -> RegenerateOutcome {
        if !self.inner.gate.ensure_active() {
            return RegenerateOutcome::CredentialRequired;
        }
        let Some(ticket) = self.update(|board| board.requeue(command.index, &command.prompt)) else {
            debug!("no slot to regenerate");
            return RegenerateOutcome::NoSuchSlot;
        };

        let options = self.with_options(|options| options.clone());
        // Runs detached: the slot settles even if this future is dropped.
        let handle = self.spawn_render(
            ticket,
            command.prompt.clone(),
            options,
            SlotError::RetryFailed,
        );
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(error = %e, "re-render task cancelled");
                SlotOutcome::Superseded
            }
        };
        RegenerateOutcome::Finished(outcome)
    }

    /// Replaces the published titles with fresh candidates for `command.topic`.
    #[instrument(skip(self, command), fields(correlation_id = %command.correlation_id()))]
    pub async fn regenerate_titles(&self, command: &RegenerateTitles) -> TitlesOutcome {
        let generation = self.inner.board.borrow().generation();
        self.update(|board| board.set_regenerating_titles(true).then_some(()));

        let result = self.inner.service.generate_titles(&command.topic).await;

        self.update(|board| board.set_regenerating_titles(false).then_some(()));
        match result {
            Ok(titles) => {
                let replaced = self
                    .update(|board| board.replace_titles(generation, titles.clone()).then_some(()))
                    .is_some();
                if replaced {
                    info!(count = titles.len(), "titles regenerated");
                    TitlesOutcome::Replaced(titles)
                } else {
                    warn!("titles arrived after a newer request; dropped");
                    TitlesOutcome::Superseded
                }
            }
            Err(e) => {
                error!(error = %e, "failed to regenerate titles");
                if e.is_authorization_failure() {
                    self.inner.gate.mark_failed().await;
                }
                TitlesOutcome::Failed(e)
            }
        }
    }

    /// Replaces the render settings used by renders launched from now on.
    pub fn set_render_settings(&self, settings: RenderSettings) {
        self.with_options(|options| options.settings = settings);
    }

    /// Current render settings.
    #[must_use]
    pub fn render_settings(&self) -> RenderSettings {
        self.with_options(|options| options.settings)
    }

    /// Replaces the reference image used by renders launched from now on.
    pub fn set_reference_image(&self, reference_image: Option<String>) {
        self.with_options(|options| options.reference_image = reference_image);
    }

    /// Current reference image.
    #[must_use]
    pub fn reference_image(&self) -> Option<String> {
        self.with_options(|options| options.reference_image.clone())
    }

    /// Uses the rendered image of slot `index` as the reference image.
    /// Returns `false` if that slot has no image.
    pub fn use_scene_as_reference(&self, index: usize) -> bool {
        let url = self
            .inner
            .board
            .borrow()
            .scenes()
            .get(index)
            .and_then(|scene| scene.image_url().map(str::to_owned));
        match url {
            Some(url) => {
                self.set_reference_image(Some(url));
                true
            }
            None => false,
        }
    }

    /// Current board.
    #[must_use]
    pub fn snapshot(&self) -> SceneBoard {
        self.inner.board.borrow().clone()
    }

    /// Subscribes to board changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SceneBoard> {
        self.inner.board.subscribe()
    }

    /// The history store renders are recorded in.
    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.inner.history
    }

    /// The credential gate consulted before every request.
    #[must_use]
    pub fn gate(&self) -> &Arc<CredentialGate> {
        &self.inner.gate
    }

    /// The single entry point that mutates the board. `transform` always sees
    /// the latest board; returning `None` means nothing changed and
    /// subscribers are not notified.
    fn update<R>(&self, transform: impl FnOnce(&mut SceneBoard) -> Option<R>) -> Option<R> {
        let mut result = None;
        self.inner.board.send_if_modified(|board| {
            result = transform(board);
            result.is_some()
        });
        result
    }

    fn with_options<R>(&self, f: impl FnOnce(&mut RenderOptions) -> R) -> R {
        let mut options = self
            .inner
            .options
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut options)
    }

    fn spawn_render(
        &self,
        ticket: RenderTicket,
        prompt: String,
        options: RenderOptions,
        failure: SlotError,
    ) -> JoinHandle<SlotOutcome> {
        let this = self.clone();
        let span = info_span!("render_scene", generation = ticket.generation, index = ticket.index);
        tokio::spawn(
            async move { this.render(ticket, prompt, &options, failure).await }.instrument(span),
        )
    }

    async fn render(
        &self,
        ticket: RenderTicket,
        prompt: String,
        options: &RenderOptions,
        failure: SlotError,
    ) -> SlotOutcome {
        let result = self
            .inner
            .service
            .generate_scene_image(&options.settings, &prompt, options.reference_image.as_deref())
            .await;

        match result {
            Ok(url) => {
                let applied = self
                    .update(|board| board.complete(ticket, Ok(url.clone())).then_some(()))
                    .is_some();
                self.inner.history.record(url.clone(), MediaType::Image, prompt);
                if applied {
                    debug!(index = ticket.index, "scene rendered");
                    SlotOutcome::Rendered(url)
                } else {
                    warn!(index = ticket.index, generation = ticket.generation, "stale render result ignored");
                    SlotOutcome::Superseded
                }
            }
            Err(e) => {
                error!(index = ticket.index, error = %e, "scene render failed");
                if e.is_authorization_failure() {
                    self.inner.gate.mark_failed().await;
                }
                let applied = self
                    .update(|board| board.complete(ticket, Err(failure)).then_some(()))
                    .is_some();
                if applied {
                    SlotOutcome::Failed(e)
                } else {
                    debug!(index = ticket.index, "stale render failure ignored");
                    SlotOutcome::Superseded
                }
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let board = self.inner.board.borrow();
        f.debug_struct("Orchestrator")
            .field("generation", &board.generation())
            .field("phase", &board.phase())
            .field("scenes", &board.scenes().len())
            .finish_non_exhaustive()
    }
}
