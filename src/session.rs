//! Session & Handler Registry (§4.5): per-connection state, the
//! four-state machine, and the set of enabled extensions.
//!
//! Grounded on
//! `examples/deuxfleurs-org-aerogramme/aero-proto/src/imap/session.rs`'s
//! `Instance { state: flow::State, ... }` shape for the dispatch-then-
//! apply-transition pattern. STORE's `.SILENT` suppression (§9) is
//! carried entirely by the parsed command (`StoreCommand::silent`) and
//! handled locally in `handlers::selected::store`, not as session state.

use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::{Mailbox, User};

/// The four states a connection moves through. `Logout` is terminal.
pub enum State {
    NotAuthenticated,
    Authenticated(Arc<dyn User>),
    Selected {
        user: Arc<dyn User>,
        mailbox: Arc<dyn Mailbox>,
        read_only: bool,
    },
    Logout,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::NotAuthenticated => write!(f, "NotAuthenticated"),
            State::Authenticated(_) => write!(f, "Authenticated"),
            State::Selected { read_only, .. } => write!(f, "Selected(read_only={read_only})"),
            State::Logout => write!(f, "Logout"),
        }
    }
}

/// What a handler wants to happen to session state after it runs.
pub enum Transition {
    None,
    Authenticate(Arc<dyn User>),
    Select {
        user: Arc<dyn User>,
        mailbox: Arc<dyn Mailbox>,
        read_only: bool,
    },
    Unselect,
    Logout,
}

/// Per-connection context: session state plus the bits orthogonal to it
/// (§3 Data Model "Session Context").
pub struct Session {
    pub state: State,
    pub enabled_extensions: HashSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: State::NotAuthenticated,
            enabled_extensions: HashSet::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self.state, State::NotAuthenticated | State::Logout)
    }

    pub fn is_selected(&self) -> bool {
        matches!(self.state, State::Selected { .. })
    }

    pub fn read_only(&self) -> bool {
        matches!(self.state, State::Selected { read_only: true, .. })
    }

    pub fn user(&self) -> Option<&Arc<dyn User>> {
        match &self.state {
            State::Authenticated(u) => Some(u),
            State::Selected { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn mailbox(&self) -> Option<&Arc<dyn Mailbox>> {
        match &self.state {
            State::Selected { mailbox, .. } => Some(mailbox),
            _ => None,
        }
    }

    pub fn condstore_enabled(&self) -> bool {
        self.enabled_extensions.contains("CONDSTORE")
    }

    pub fn qresync_enabled(&self) -> bool {
        self.enabled_extensions.contains("QRESYNC")
    }

    pub fn enable(&mut self, capabilities: &[String]) {
        for cap in capabilities {
            self.enabled_extensions.insert(cap.to_ascii_uppercase());
        }
    }

    /// Applies a handler's requested [`Transition`], per §4.5's state
    /// diagram. SELECT's deselect-before-attempt behavior (§9) lives in
    /// the handler, not here: by the time `Transition::Select` reaches
    /// this function the new mailbox has already been chosen
    /// successfully, so this method only ever installs it.
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Authenticate(user) => {
                self.state = State::Authenticated(user);
            }
            Transition::Select {
                user,
                mailbox,
                read_only,
            } => {
                self.state = State::Selected {
                    user,
                    mailbox,
                    read_only,
                };
            }
            Transition::Unselect => {
                if let Some(user) = self.user().cloned() {
                    self.state = State::Authenticated(user);
                }
            }
            Transition::Logout => {
                self.state = State::Logout;
            }
        }
    }

    /// Nulls the current selection unconditionally, without installing
    /// any replacement. Used by SELECT/EXAMINE per the load-bearing
    /// "deselect before attempting the new selection" contract (§9):
    /// a failed SELECT must leave no selection (§8 property 1).
    pub fn deselect_to_authenticated(&mut self) {
        if let Some(user) = self.user().cloned() {
            self.state = State::Authenticated(user);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
