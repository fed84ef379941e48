//! Error kinds for the core. Kept as small closed enums so handlers can
//! match on them instead of string-sniffing, per the "error kinds, not
//! types" guidance the backend contracts are built around.

use thiserror::Error;

/// Errors surfaced while parsing a pre-tokenized command field list.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("not enough arguments")]
    NotEnoughArguments,
    #[error("invalid sequence set")]
    InvalidSequenceSet,
    #[error("invalid {0}")]
    Invalid(&'static str),
    #[error("item must be string")]
    ItemMustBeString,
    #[error("command unsupported with UID")]
    UidUnsupported,
    #[error("unknown command")]
    UnknownCommand,
}

/// State-gated errors: the session isn't in the right state for the command.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("no mailbox selected")]
    NoMailboxSelected,
    #[error("mailbox is read-only")]
    ReadOnly,
}

/// Errors a backend (the `Mailbox`/`User` trait implementor) can report.
#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("no such mailbox")]
    NoSuchMailbox,
    #[error("backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Errors from the chunked seekable assembler.
#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("message size too big")]
    TooBig,
    #[error("unexpected EOF while reading literal")]
    UnexpectedEof,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
