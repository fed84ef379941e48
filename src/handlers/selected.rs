//! Selected-state commands (§4.6), grounded on
//! `examples/deuxfleurs-org-aerogramme/aero-proto/src/imap/command/selected.rs`'s
//! `SelectedContext` and `examples/original_source/server/cmd_selected.go`.

use std::sync::Arc;

use anyhow::Result;

use crate::backend::{FlagOp, Mailbox, StatusItem};
use crate::command::{Command, StoreOp};
use crate::error::StateError;
use crate::ext::{self, ExtensionOption};
use crate::response::{self, Line, Response};
use crate::seq::SequenceSet;
use crate::session::{Session, Transition};

use super::{anystate, authenticated};

/// Commands valid while Selected: the ones this module owns directly,
/// plus a fallback to [`authenticated::dispatch`] for everything shared
/// between the two states (LIST, STATUS, CREATE, ...), exactly mirroring
/// the Go `SelectedContext`'s embedding of its Authenticated counterpart.
pub async fn dispatch(session: &mut Session, tag: &str, cmd: Command) -> Result<Response> {
    match cmd {
        Command::Capability => Ok(anystate::capability(tag)),
        Command::Noop => Ok(anystate::noop(tag)),
        Command::Logout => Ok(anystate::logout(session, tag)),

        Command::Close => close(session, tag).await,
        Command::Unselect => unselect(session, tag).await,
        Command::Check => check(session, tag).await,
        Command::Expunge { uid_sequence_set } => expunge(session, tag, uid_sequence_set).await,
        Command::Search { uid, criteria_atom } => search(session, tag, uid, &criteria_atom).await,
        Command::Fetch(fetch_cmd) => fetch(session, tag, fetch_cmd).await,
        Command::Store(store_cmd) => store(session, tag, store_cmd).await,
        Command::Copy { uid, sequence_set, mailbox } => copy(session, tag, uid, sequence_set, &mailbox).await,

        // SELECT re-entrancy, LIST, STATUS, CREATE, etc. are legal while
        // already Selected (§4.5's state diagram) and behave identically.
        other => authenticated::dispatch(session, tag, other).await,
    }
}

fn current_mailbox(session: &Session) -> Option<Arc<dyn Mailbox>> {
    session.mailbox().cloned()
}

/// CLOSE: silently expunges `\Deleted` messages (unless the mailbox was
/// selected read-only via EXAMINE, §11), then deselects without emitting
/// any untagged response at all (§4.6, unlike UNSELECT and unlike plain
/// EXPUNGE).
async fn close(session: &mut Session, tag: &str) -> Result<Response> {
    let Some(mailbox) = current_mailbox(session) else {
        return Ok(Response::builder(tag).no(None, StateError::NoMailboxSelected.to_string()));
    };
    if !session.read_only() {
        mailbox.expunge(&[]).await?;
    }
    mailbox.deselect().await.ok();
    session.apply(Transition::Unselect);
    Ok(Response::builder(tag).ok(None, "CLOSE completed"))
}

/// UNSELECT (RFC 3691): deselects without expunging and without any
/// untagged response, unlike CLOSE.
async fn unselect(session: &mut Session, tag: &str) -> Result<Response> {
    let Some(mailbox) = current_mailbox(session) else {
        return Ok(Response::builder(tag).no(None, StateError::NoMailboxSelected.to_string()));
    };
    mailbox.deselect().await.ok();
    session.apply(Transition::Unselect);
    Ok(Response::builder(tag).ok(None, "UNSELECT completed"))
}

/// CHECK: gated like EXPUNGE (a housekeeping hint to the backend), never
/// produces untagged output (§11 supplement).
async fn check(session: &mut Session, tag: &str) -> Result<Response> {
    let Some(mailbox) = current_mailbox(session) else {
        return Ok(Response::builder(tag).no(None, StateError::NoMailboxSelected.to_string()));
    };
    mailbox.check().await?;
    Ok(Response::builder(tag).ok(None, "CHECK completed"))
}

/// EXPUNGE / `UID EXPUNGE <set>` (UIDPLUS, §4.5). Emits `* n EXPUNGE` in
/// descending sequence-number order (§8 property 2) unless QRESYNC is
/// enabled, in which case the backend's `QresyncVanished` result is
/// preferred and rendered as VANISHED instead (mutual exclusion, §4.6).
async fn expunge(session: &mut Session, tag: &str, uid_sequence_set: Option<SequenceSet>) -> Result<Response> {
    if session.read_only() {
        return Ok(Response::builder(tag).no(None, StateError::ReadOnly.to_string()));
    }
    let Some(mailbox) = current_mailbox(session) else {
        return Ok(Response::builder(tag).no(None, StateError::NoMailboxSelected.to_string()));
    };

    let mut opts = Vec::new();
    if let Some(set) = uid_sequence_set {
        opts.push(ExtensionOption::ExpungeSeqSet { set });
    }

    let results = mailbox.expunge(&opts).await?;

    let lines = if session.qresync_enabled() {
        ext::vanished(&results)
            .into_iter()
            .map(|(set, earlier)| response::vanished_line(set.to_wire_string(), earlier))
            .collect()
    } else if !mailbox.broadcasts_updates() {
        let mut nums = ext::expunged_seq_nums(&results).unwrap_or(&[]).to_vec();
        nums.sort_unstable_by(|a, b| b.cmp(a));
        response::fetch::expunge_lines(&nums)
    } else {
        Vec::new()
    };

    Ok(Response::builder(tag).lines(lines).ok(None, "EXPUNGE completed"))
}

/// SEARCH / UID SEARCH. Full search-criteria grammar is an external
/// collaborator (§1 Non-goal); this core recognizes only the `DELETED`
/// criterion directly, per the backend contract's `deleted_only` flag.
async fn search(session: &mut Session, tag: &str, uid: bool, criteria_atom: &str) -> Result<Response> {
    let Some(mailbox) = current_mailbox(session) else {
        return Ok(Response::builder(tag).no(None, StateError::NoMailboxSelected.to_string()));
    };

    let deleted_only = criteria_atom.to_ascii_uppercase().contains("DELETED");
    let (ids, results) = mailbox.search_messages(uid, deleted_only, &[]).await?;

    let modseq = if session.condstore_enabled() {
        ext::search_modseq(&results)
    } else {
        None
    };

    let line = Line::Search { ids, modseq };
    Ok(Response::builder(tag).line(line).ok(None, "SEARCH completed"))
}

/// FETCH / UID FETCH, including CONDSTORE's `CHANGEDSINCE` filter and
/// QRESYNC's `VANISHED` companion stream (§4.3, §4.4, §4.6).
async fn fetch(session: &mut Session, tag: &str, cmd: crate::command::FetchCommand) -> Result<Response> {
    let Some(mailbox) = current_mailbox(session) else {
        return Ok(Response::builder(tag).no(None, StateError::NoMailboxSelected.to_string()));
    };

    let max = resolve_max(&mailbox, cmd.uid).await?;
    let set = SequenceSet::parse(&cmd.sequence_set_atom, max)?;

    let mut opts = Vec::new();
    if let Some(changed_since) = cmd.changed_since {
        opts.push(ExtensionOption::CondstoreFetch { changed_since });
    }
    if cmd.enable_vanished {
        opts.push(ExtensionOption::QresyncFetch { enable_vanished: true });
    }

    let (messages, results) = mailbox.list_messages(cmd.uid, Some(&set), &cmd.items, &opts).await?;

    let wants_modseq = cmd.items.iter().any(|i| i == "MODSEQ");
    let mut lines: Vec<Line> = messages
        .iter()
        .map(|m| Line::Fetch {
            seq: m.seq,
            uid: Some(m.uid),
            modseq: if wants_modseq { Some(m.modseq) } else { None },
            flags: Some(m.flags.clone()),
        })
        .collect();

    if cmd.enable_vanished {
        for (vset, _earlier) in ext::vanished(&results) {
            lines.push(response::vanished_line(vset.to_wire_string(), true));
        }
    }

    Ok(Response::builder(tag).lines(lines).ok(None, "FETCH completed"))
}

/// STORE / UID STORE, including `UNCHANGEDSINCE` (CONDSTORE) and the
/// `.SILENT` suffix that suppresses the handler's own untagged FETCH
/// notification for this connection (§4.6).
async fn store(session: &mut Session, tag: &str, cmd: crate::command::StoreCommand) -> Result<Response> {
    let Some(mailbox) = current_mailbox(session) else {
        return Ok(Response::builder(tag).no(None, StateError::NoMailboxSelected.to_string()));
    };
    if session.read_only() {
        return Ok(Response::builder(tag).no(None, StateError::ReadOnly.to_string()));
    }

    let max = resolve_max(&mailbox, cmd.uid).await?;
    let set = SequenceSet::parse(&cmd.sequence_set_atom, max)?;

    let op = match cmd.op {
        StoreOp::Add => FlagOp::Add,
        StoreOp::Remove => FlagOp::Remove,
        StoreOp::Replace => FlagOp::Replace,
    };

    let mut opts = Vec::new();
    if let Some(unchanged_since) = cmd.unchanged_since {
        opts.push(ExtensionOption::CondstoreStore { unchanged_since });
    }

    let canon_flags: Vec<String> = cmd.flags.iter().map(|f| crate::flags::canonical_flag(f)).collect();
    mailbox.update_messages_flags(cmd.uid, &set, op, &canon_flags, &opts).await?;

    if cmd.silent {
        return Ok(Response::builder(tag).ok(None, "STORE completed"));
    }
    if mailbox.broadcasts_updates() {
        return Ok(Response::builder(tag).ok(None, "STORE completed"));
    }

    let fetch_items = vec!["FLAGS".to_string()];
    let (messages, _results) = mailbox.list_messages(cmd.uid, Some(&set), &fetch_items, &[]).await?;
    let lines = if session.condstore_enabled() {
        response::fetch::modseq_fetch_lines(&messages)
    } else {
        messages
            .iter()
            .map(|m| Line::Fetch {
                seq: m.seq,
                uid: Some(m.uid),
                modseq: None,
                flags: Some(m.flags.clone()),
            })
            .collect()
    };

    Ok(Response::builder(tag).lines(lines).ok(None, "STORE completed"))
}

/// COPY / UID COPY, emitting `COPYUID` (UIDPLUS) when the backend
/// advertises it and reports one (§4.5 Non-goal: MOVE is excluded,
/// matching the Go source's `r#move` being unimplemented in this core).
async fn copy(session: &mut Session, tag: &str, uid: bool, sequence_set: SequenceSet, dest_name: &str) -> Result<Response> {
    let Some(mailbox) = current_mailbox(session) else {
        return Ok(Response::builder(tag).no(None, StateError::NoMailboxSelected.to_string()));
    };
    let Some(user) = session.user().cloned() else {
        return Ok(Response::builder(tag).no(None, StateError::NotAuthenticated.to_string()));
    };

    let dest = match user.get_mailbox(dest_name).await {
        Ok(mb) => mb,
        Err(crate::error::MailboxError::NoSuchMailbox) => {
            return Ok(Response::builder(tag).no(Some("TRYCREATE".to_string()), "No such mailbox"))
        }
        Err(e) => return Ok(Response::builder(tag).no(None, e.to_string())),
    };

    let results = mailbox.copy_messages(uid, &sequence_set, dest.as_ref(), &[]).await?;

    let code = if user.has_uidplus() {
        ext::copy_uids(&results).map(|(uv, src, dst)| format!("COPYUID {uv} {} {}", src.to_wire_string(), dst.to_wire_string()))
    } else {
        None
    };

    Ok(Response::builder(tag).ok(code, "COPY completed"))
}

/// Resolves the upper bound a bare `*` in a sequence set refers to: the
/// message count for plain sequence numbers, or `UIDNEXT` for UID sets
/// (§3's Sequence Set entity).
async fn resolve_max(mailbox: &Arc<dyn Mailbox>, uid: bool) -> Result<u32> {
    let items = if uid { [StatusItem::UidNext].to_vec() } else { [StatusItem::Messages].to_vec() };
    let (status, _) = mailbox.status(&items, &[]).await?;
    Ok(if uid { status.uid_next } else { status.messages })
}
