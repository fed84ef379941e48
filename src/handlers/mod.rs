//! Command Handlers (§4.6): the heart of the core. Each state module
//! below mirrors the teacher's per-state context structs
//! (`examples/deuxfleurs-org-aerogramme/aero-proto/src/imap/command/{authenticated,selected}.rs`'s
//! `AuthenticatedContext`/`SelectedContext`), reworked as free functions
//! over `&mut Session` plus the parsed command.

pub mod authenticated;
pub mod not_authenticated;
pub mod selected;

use crate::command::Command;
use crate::registry;
use crate::response::{Response, Status};
use crate::session::Session;

/// Commands valid in any state, per §4.5's state diagram (CAPABILITY,
/// NOOP, LOGOUT). Shared so each state module can fall back to it
/// without duplicating the bodies.
pub(crate) mod anystate {
    use super::*;

    pub fn capability(tag: &str) -> Response {
        Response::builder(tag).ok(
            None,
            "CAPABILITY completed: IMAP4rev1 CONDSTORE QRESYNC UNSELECT UIDPLUS ENABLE",
        )
    }

    pub fn noop(tag: &str) -> Response {
        Response::builder(tag).ok(None, "NOOP completed")
    }

    pub fn logout(session: &mut Session, tag: &str) -> Response {
        session.apply(crate::session::Transition::Logout);
        Response::builder(tag).ok(None, "LOGOUT completed")
    }
}

/// Top-level dispatch: resolves the UID-prefix gate (§4.5), then routes
/// to the state-appropriate handler based on `session.state`. A handler
/// never sees raw wire bytes; by the time a `Command` reaches here the
/// external tokenizer and this crate's own Command Parser have already
/// run.
pub async fn dispatch(session: &mut Session, tag: &str, cmd: Command, is_uid_prefixed: bool) -> Response {
    if is_uid_prefixed {
        if let Err(e) = registry::check_uid_capable(cmd.name()) {
            return Response::builder(tag).bad(e.to_string());
        }
    }

    if let Command::Expunge { .. } = &cmd {
        let has_uidplus = session.user().map(|u| u.has_uidplus()).unwrap_or(false);
        if let Err(e) = registry::check_uid_expunge(&cmd, has_uidplus) {
            return Response::builder(tag).bad(e.to_string());
        }
    }

    let result = if session.is_selected() {
        selected::dispatch(session, tag, cmd).await
    } else if session.is_authenticated() {
        authenticated::dispatch(session, tag, cmd).await
    } else {
        not_authenticated::dispatch(session, tag, cmd).await
    };

    match result {
        Ok(resp) => resp,
        Err(e) => Response {
            lines: Vec::new(),
            tag: tag.to_string(),
            status: Status::Bad,
            code: None,
            message: format!("Internal error while processing command: {e}"),
        },
    }
}
