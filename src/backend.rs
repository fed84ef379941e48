//! Backend interface (§6): consumed, not implemented, by this core. A
//! production embedder provides a `User`/`Mailbox` implementation (the
//! "in-memory sample mailbox store" referenced in §1 is explicitly out
//! of scope); tests drive a minimal mock of these traits.
//!
//! UID/UIDVALIDITY/per-message-ModSeq are modeled as `NonZero*` newtypes,
//! grounded on `aero-collections/src/mail/uidindex.rs`'s
//! `ImapUid = NonZeroU32` / `ImapUidvalidity = NonZeroU32` /
//! `ModSeq = NonZeroU64` aliases.

use std::collections::HashSet;
use std::num::{NonZeroU32, NonZeroU64};

use async_trait::async_trait;

use crate::error::MailboxError;
use crate::ext::{ExtensionOption, ExtensionResult};
use crate::seq::SequenceSet;

pub type Uid = NonZeroU32;
pub type UidValidity = NonZeroU32;
pub type ModSeq = NonZeroU64;

/// Which `MailboxStatus` fields a particular call actually populated.
/// Response emitters must only print fields recorded here (§3 invariant v).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusItem {
    Messages,
    Recent,
    Unseen,
    UidNext,
    UidValidity,
    HighestModseq,
    Deleted,
    DeletedStorage,
}

#[derive(Debug, Clone, Default)]
pub struct MailboxStatus {
    pub flags: Vec<String>,
    pub permanent_flags: Vec<String>,
    pub unseen_seq_num: u32,
    pub messages: u32,
    pub recent: u32,
    pub uid_next: u32,
    pub uid_validity: u32,
    pub highest_modseq: u64,
    pub read_only: bool,
    pub items: HashSet<StatusItem>,
}

#[derive(Debug, Clone)]
pub struct MailboxInfo {
    pub name: String,
    pub delimiter: char,
    pub no_select: bool,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MessageData {
    pub seq: u32,
    pub uid: u32,
    pub modseq: u64,
    pub flags: Vec<String>,
    /// Populated only when the requested items included something
    /// beyond FLAGS/UID/MODSEQ; opaque to this core (§1 Non-goal: full
    /// MIME body parsing).
    pub body_summary: Option<String>,
}

/// Flag-update operation for STORE, mirroring the Go `imap.FlagsOp`
/// (`+FLAGS` adds, `-FLAGS` removes, bare `FLAGS` replaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOp {
    Add,
    Remove,
    Replace,
}

/// A mailbox the session has currently selected, or is listing/querying
/// while Authenticated.
#[async_trait]
pub trait Mailbox: Send + Sync {
    fn name(&self) -> &str;

    async fn info(&self, opts: &[ExtensionOption]) -> Result<(MailboxInfo, Vec<ExtensionResult>), MailboxError>;

    async fn status(
        &self,
        items: &[StatusItem],
        opts: &[ExtensionOption],
    ) -> Result<(MailboxStatus, Vec<ExtensionResult>), MailboxError>;

    async fn set_subscribed(&self, subscribed: bool) -> Result<(), MailboxError>;

    async fn check(&self) -> Result<(), MailboxError>;

    async fn select(&self, opts: &[ExtensionOption]) -> Result<Vec<ExtensionResult>, MailboxError>;

    async fn deselect(&self) -> Result<(), MailboxError>;

    /// Returns the message batch matching `set` (or all messages, if
    /// `set` is `None` — used by EXPUNGE's pre-delete DELETED-flag scan).
    async fn list_messages(
        &self,
        uid: bool,
        set: Option<&SequenceSet>,
        items: &[String],
        opts: &[ExtensionOption],
    ) -> Result<(Vec<MessageData>, Vec<ExtensionResult>), MailboxError>;

    async fn search_messages(
        &self,
        uid: bool,
        deleted_only: bool,
        opts: &[ExtensionOption],
    ) -> Result<(Vec<u32>, Vec<ExtensionResult>), MailboxError>;

    async fn create_message(
        &self,
        flags: &[String],
        date: Option<chrono::DateTime<chrono::Utc>>,
        literal: &mut (dyn std::io::Read + Send),
        opts: &[ExtensionOption],
    ) -> Result<Vec<ExtensionResult>, MailboxError>;

    async fn update_messages_flags(
        &self,
        uid: bool,
        set: &SequenceSet,
        op: FlagOp,
        flags: &[String],
        opts: &[ExtensionOption],
    ) -> Result<Vec<ExtensionResult>, MailboxError>;

    async fn copy_messages(
        &self,
        uid: bool,
        set: &SequenceSet,
        dest: &dyn Mailbox,
        opts: &[ExtensionOption],
    ) -> Result<Vec<ExtensionResult>, MailboxError>;

    async fn expunge(&self, opts: &[ExtensionOption]) -> Result<Vec<ExtensionResult>, MailboxError>;

    /// Whether this backend broadcasts its own unsolicited updates to
    /// other connections (if so, handlers must not also synthesize
    /// EXPUNGE/FETCH lines themselves — §4.6).
    fn broadcasts_updates(&self) -> bool {
        false
    }
}

/// The authenticated principal, exposing mailbox lifecycle operations.
#[async_trait]
pub trait User: Send + Sync {
    async fn get_mailbox(&self, name: &str) -> Result<std::sync::Arc<dyn Mailbox>, MailboxError>;

    async fn list_mailboxes(&self, subscribed: bool) -> Result<Vec<MailboxInfo>, MailboxError>;

    async fn create(&self, name: &str) -> Result<(), MailboxError>;
    async fn delete(&self, name: &str) -> Result<(), MailboxError>;
    async fn rename(&self, from: &str, to: &str) -> Result<(), MailboxError>;
    async fn unselect(&self) -> Result<(), MailboxError>;

    /// Whether the backend advertises the UIDPLUS extension (gates
    /// `UID EXPUNGE`, §4.5).
    fn has_uidplus(&self) -> bool {
        false
    }

    fn is_enable_qresync(&self) -> bool {
        false
    }
}
