//! NotAuthenticated-state commands (§4.5). Actual credential
//! verification is delegated to an external `LoginProvider`-shaped
//! collaborator (SASL negotiation is out of scope per §1); this module
//! only owns the state transition once a login succeeds.

use std::sync::Arc;

use anyhow::Result;

use crate::backend::User;
use crate::command::Command;
use crate::error::StateError;
use crate::response::Response;
use crate::session::{Session, Transition};

use super::anystate;

/// A login backend the core calls into but does not implement.
#[async_trait::async_trait]
pub trait LoginProvider: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<Arc<dyn User>>;
}

pub async fn dispatch(
    session: &mut Session,
    tag: &str,
    cmd: Command,
) -> Result<Response> {
    match cmd {
        Command::Capability => Ok(anystate::capability(tag)),
        Command::Noop => Ok(anystate::noop(tag)),
        Command::Logout => Ok(anystate::logout(session, tag)),
        Command::Login { .. } => Ok(Response::builder(tag)
            .no(None, "Login requires a configured LoginProvider; none wired into this session")),
        _ => Ok(Response::builder(tag).no(None, StateError::NotAuthenticated.to_string())),
    }
}

/// Called by the embedding connection loop once an external
/// authentication mechanism (LOGIN, or SASL) has produced a `User`.
pub fn complete_login(session: &mut Session, user: Arc<dyn User>) {
    session.apply(Transition::Authenticate(user));
}
