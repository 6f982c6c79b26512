//! The storyboard: an ordered, versioned collection of scene slots plus the
//! metadata published with it.

use std::sync::Arc;

use storyboard_core::story::{StoryResult, TitleData};

use super::scene::{Scene, SlotError};

/// Lifecycle of one storyboard request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoardPhase {
    /// Nothing requested, or the last structure call failed.
    #[default]
    Idle,
    /// Waiting for the structure call.
    StructureRequested,
    /// `active` render tasks are outstanding.
    Rendering {
        /// Outstanding render tasks.
        active: usize,
    },
    /// Every launched render has settled.
    Done,
}

/// Identifies one launched render so its result can only land in the slot,
/// request and attempt it was launched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTicket {
    /// Request generation the render belongs to.
    pub generation: u64,
    /// Slot position.
    pub index: usize,
    /// Board-wide attempt number.
    pub attempt: u64,
}

/// Ordered scene collection and published metadata.
///
/// Slot writes replace the whole scene list with a copy that differs in one
/// position, so snapshots handed out earlier never change underneath their
/// readers. Results carry a [`RenderTicket`]; a result whose generation or
/// attempt is no longer current is ignored.
#[derive(Debug, Clone, Default)]
pub struct SceneBoard {
    generation: u64,
    phase: BoardPhase,
    scenes: Arc<[Scene]>,
    attempts: Vec<Option<u64>>,
    next_attempt: u64,
    titles: Vec<TitleData>,
    music_prompt: Option<String>,
    lyrics: Option<String>,
    lyrics_korean: Option<String>,
    regenerating_titles: bool,
}

impl SceneBoard {
    /// Starts a new request: clears every slot and all metadata, and returns
    /// the new generation.
    pub fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.phase = BoardPhase::StructureRequested;
        self.scenes = Arc::from(Vec::new());
        self.attempts.clear();
        self.titles.clear();
        self.music_prompt = None;
        self.lyrics = None;
        self.lyrics_korean = None;
        self.regenerating_titles = false;
        self.generation
    }

    /// Records that the structure call for `generation` failed. Returns
    /// `false` if a newer request has started.
    pub fn fail_structure(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.phase = BoardPhase::Idle;
        true
    }

    /// Materializes one loading slot per scene draft, publishes the
    /// metadata, and returns a ticket and prompt per slot in slot order.
    /// Returns `None` if a newer request has started.
    pub fn initialize(
        &mut self,
        generation: u64,
        story: &StoryResult,
    ) -> Option<Vec<(RenderTicket, String)>> {
        if generation != self.generation {
            return None;
        }

        self.scenes = story
            .scenes
            .iter()
            .enumerate()
            .map(|(index, draft)| {
                Scene::loading(index, draft.image_prompt.clone(), draft.description.clone())
            })
            .collect();
        self.titles.clone_from(&story.titles);
        self.music_prompt = Some(story.music_prompt.clone());
        self.lyrics = Some(story.lyrics.clone());
        self.lyrics_korean = Some(story.lyrics_korean.clone());

        let launches: Vec<(RenderTicket, String)> = story
            .scenes
            .iter()
            .enumerate()
            .map(|(index, draft)| (self.issue_ticket(index), draft.image_prompt.clone()))
            .collect();
        self.attempts = launches
            .iter()
            .map(|(ticket, _)| Some(ticket.attempt))
            .collect();
        self.phase = if launches.is_empty() {
            BoardPhase::Done
        } else {
            BoardPhase::Rendering {
                active: launches.len(),
            }
        };
        Some(launches)
    }

    /// Resets the slot at `index` for a re-render with `image_prompt`,
    /// leaving every other slot untouched. Returns `None` if no such slot
    /// exists.
    pub fn requeue(&mut self, index: usize, image_prompt: &str) -> Option<RenderTicket> {
        let scene = self.scenes.get(index)?.requeued(image_prompt.to_owned());
        let ticket = self.issue_ticket(index);
        // A render already outstanding for this slot is superseded rather
        // than added to.
        if self.attempts[index].replace(ticket.attempt).is_none() {
            self.adjust_active(1);
        }
        self.replace_slot(index, scene);
        Some(ticket)
    }

    /// Applies a finished render. Returns `false` without touching anything
    /// if the ticket is stale.
    pub fn complete(&mut self, ticket: RenderTicket, outcome: Result<String, SlotError>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let scene = match outcome {
            Ok(url) => self.scenes[ticket.index].rendered(url),
            Err(error) => self.scenes[ticket.index].failed(error),
        };
        self.attempts[ticket.index] = None;
        self.replace_slot(ticket.index, scene);
        self.adjust_active(-1);
        true
    }

    /// Replaces the published titles if `generation` is still current.
    pub fn replace_titles(&mut self, generation: u64, titles: Vec<TitleData>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.titles = titles;
        true
    }

    /// Sets the "titles are being regenerated" flag. Returns `true` if it
    /// changed.
    pub fn set_regenerating_titles(&mut self, regenerating: bool) -> bool {
        let changed = self.regenerating_titles != regenerating;
        self.regenerating_titles = regenerating;
        changed
    }

    /// Whether `ticket` still owns its slot.
    #[must_use]
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.generation == self.generation
            && self.attempts.get(ticket.index).copied().flatten() == Some(ticket.attempt)
    }

    /// Current request generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    /// Slots in position order.
    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Shared handle to the current slot list.
    #[must_use]
    pub fn scenes_snapshot(&self) -> Arc<[Scene]> {
        Arc::clone(&self.scenes)
    }

    /// Published title candidates.
    #[must_use]
    pub fn titles(&self) -> &[TitleData] {
        &self.titles
    }

    /// Published music prompt.
    #[must_use]
    pub fn music_prompt(&self) -> Option<&str> {
        self.music_prompt.as_deref()
    }

    /// Published lyrics.
    #[must_use]
    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics.as_deref()
    }

    /// Published Korean lyrics.
    #[must_use]
    pub fn lyrics_korean(&self) -> Option<&str> {
        self.lyrics_korean.as_deref()
    }

    /// Whether the structure call is outstanding.
    #[must_use]
    pub fn is_generating_story(&self) -> bool {
        self.phase == BoardPhase::StructureRequested
    }

    /// Whether titles are being regenerated.
    #[must_use]
    pub fn is_regenerating_titles(&self) -> bool {
        self.regenerating_titles
    }

    fn issue_ticket(&mut self, index: usize) -> RenderTicket {
        self.next_attempt += 1;
        RenderTicket {
            generation: self.generation,
            index,
            attempt: self.next_attempt,
        }
    }

    fn replace_slot(&mut self, index: usize, scene: Scene) {
        let mut next = self.scenes.to_vec();
        next[index] = scene;
        self.scenes = next.into();
    }

    fn adjust_active(&mut self, delta: isize) {
        let active = match self.phase {
            BoardPhase::Rendering { active } => active,
            _ => 0,
        };
        let active = active.saturating_add_signed(delta);
        self.phase = if active == 0 {
            BoardPhase::Done
        } else {
            BoardPhase::Rendering { active }
        };
    }
}
