//! Gate state transitions.

/// Outcome of checking the gate before a generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A credential is active; the caller may proceed.
    Admitted,
    /// No credential is active. `open_prompt` is true only for the check that
    /// started the acquisition flow.
    Denied {
        /// Whether the caller must open the credential surface.
        open_prompt: bool,
    },
}

/// The active flag plus whether an acquisition flow is already running.
///
/// Transitions are idempotent so that any number of concurrent failures
/// start at most one acquisition flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateState {
    active: bool,
    prompt_open: bool,
}

impl GateState {
    /// Whether a usable credential is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the credential surface is currently open.
    #[must_use]
    pub fn is_prompt_open(&self) -> bool {
        self.prompt_open
    }

    /// Checks the gate, starting acquisition if it is closed.
    pub fn admit(&mut self) -> Admission {
        if self.active {
            return Admission::Admitted;
        }
        Admission::Denied {
            open_prompt: self.request_prompt(),
        }
    }

    /// Revokes the active credential. Returns `true` if this call started the
    /// recovery flow, `false` if one was already running.
    pub fn revoke(&mut self) -> bool {
        self.active = false;
        self.request_prompt()
    }

    /// Marks the surface open. Returns `true` if it was closed.
    pub fn request_prompt(&mut self) -> bool {
        let opened = !self.prompt_open;
        self.prompt_open = true;
        opened
    }

    /// Marks the surface closed. Returns `true` if it was open.
    pub fn close_prompt(&mut self) -> bool {
        let closed = self.prompt_open;
        self.prompt_open = false;
        closed
    }

    /// Records the result of a credential status check. Returns `true` if
    /// the flag changed.
    pub fn set_active(&mut self, active: bool) -> bool {
        let changed = self.active != active;
        self.active = active;
        changed
    }
}
