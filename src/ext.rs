//! Extension Envelope: closed tagged-variant carriers standing in for the
//! Go source's marker-interface `ExtOption`/`ExtResult` types
//! (`examples/original_source/backend/condstore_extension.go`,
//! `qresync_extension.go`). Handlers build a `Vec<ExtensionOption>` from
//! recognized command modifiers, pass it to the backend, then
//! pattern-match the returned `Vec<ExtensionResult>` by variant.
//! Unknown variants are never produced by this core, but backends written
//! against a future version of the enum could emit them; callers must
//! treat `#[non_exhaustive]` matches as logged-and-discarded, not fatal.

use crate::seq::SequenceSet;

/// A message's UID, per-message modseq and flags as reported alongside a
/// QRESYNC resync batch.
#[derive(Debug, Clone)]
pub struct QresyncMessage {
    pub seq: u32,
    pub uid: u32,
    pub modseq: u64,
    pub flags: Vec<String>,
}

/// Per-command extension options, consumed by backends.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ExtensionOption {
    CondstoreSelect,
    CondstoreStore { unchanged_since: u64 },
    CondstoreFetch { changed_since: u64 },
    QresyncSelect {
        uid_validity: u32,
        last_modseq: u64,
        uid_set: Option<SequenceSet>,
        seq_set_pair: Option<SequenceSet>,
        uid_set_pair: Option<SequenceSet>,
    },
    QresyncFetch { enable_vanished: bool },
    ExpungeSeqSet { set: SequenceSet },
}

/// Per-call extension results, emitted by backends.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ExtensionResult {
    HighestModseq(u64),
    SearchModseq(u64),
    QresyncVanished { set: SequenceSet, earlier: bool },
    QresyncMessages(Vec<QresyncMessage>),
    AppendUid { uid_validity: u32, uid: u32 },
    CopyUids {
        uid_validity: u32,
        src_set: SequenceSet,
        dst_set: SequenceSet,
    },
    /// Plain (non-QRESYNC) removed sequence numbers from an EXPUNGE call,
    /// in backend removal order. A QRESYNC-aware backend reports
    /// `QresyncVanished` instead; handlers prefer that when present (§4.6
    /// EXPUNGE/QRESYNC mutual exclusion).
    ExpungedSeqNums(Vec<u32>),
}

/// Splits a result batch into the pieces each handler cares about,
/// logging and discarding anything it doesn't recognize (it never will,
/// today, since the enum above is closed — this exists so the call sites
/// in `handlers/` read as "ignore-unknown" rather than an exhaustive
/// match that would need editing every time a variant is added).
pub fn highest_modseq(results: &[ExtensionResult]) -> Option<u64> {
    results
        .iter()
        .filter_map(|r| match r {
            ExtensionResult::HighestModseq(m) => Some(*m),
            _ => None,
        })
        .max()
}

pub fn vanished(results: &[ExtensionResult]) -> Vec<(&SequenceSet, bool)> {
    results
        .iter()
        .filter_map(|r| match r {
            ExtensionResult::QresyncVanished { set, earlier } => Some((set, *earlier)),
            _ => None,
        })
        .collect()
}

pub fn qresync_messages(results: &[ExtensionResult]) -> Vec<&QresyncMessage> {
    results
        .iter()
        .filter_map(|r| match r {
            ExtensionResult::QresyncMessages(msgs) => Some(msgs.iter()),
            _ => None,
        })
        .flatten()
        .collect()
}

pub fn append_uid(results: &[ExtensionResult]) -> Option<(u32, u32)> {
    results.iter().find_map(|r| match r {
        ExtensionResult::AppendUid { uid_validity, uid } => Some((*uid_validity, *uid)),
        _ => None,
    })
}

pub fn copy_uids(results: &[ExtensionResult]) -> Option<(u32, &SequenceSet, &SequenceSet)> {
    results.iter().find_map(|r| match r {
        ExtensionResult::CopyUids {
            uid_validity,
            src_set,
            dst_set,
        } => Some((*uid_validity, src_set, dst_set)),
        _ => None,
    })
}

pub fn search_modseq(results: &[ExtensionResult]) -> Option<u64> {
    results.iter().find_map(|r| match r {
        ExtensionResult::SearchModseq(m) => Some(*m),
        _ => None,
    })
}

pub fn expunged_seq_nums(results: &[ExtensionResult]) -> Option<&[u32]> {
    results.iter().find_map(|r| match r {
        ExtensionResult::ExpungedSeqNums(nums) => Some(nums.as_slice()),
        _ => None,
    })
}
