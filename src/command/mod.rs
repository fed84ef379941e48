//! Command Parser (§4.3): converts pre-tokenized field lists into typed
//! command records. Grounded on
//! `examples/original_source/commands/*.go`'s `Parse(fields
//! []interface{}) error` methods.

mod enable;
mod fetch;
mod list;
mod select;
mod store;

pub use enable::parse_enable;
pub use fetch::{expand_fetch_items, parse_fetch, FetchCommand};
pub use list::{parse_list, ListCommand};
pub use select::{parse_select, QresyncSelectParams, SelectCommand};
pub use store::{parse_store, StoreCommand};

use crate::seq::SequenceSet;

/// A fully parsed command, independent of session state. Handlers gate
/// on session state separately (§4.5); this enum only carries what the
/// wire sent.
#[derive(Debug, Clone)]
pub enum Command {
    Capability,
    Noop,
    Logout,
    Login { username: String, password: String },

    Create { mailbox: String },
    Delete { mailbox: String },
    Rename { from: String, to: String },
    Subscribe { mailbox: String },
    Unsubscribe { mailbox: String },
    List(ListCommand),
    Lsub(ListCommand),
    Status { mailbox: String, items: Vec<String> },
    Append { mailbox: String, flags: Vec<String>, literal_len: u64 },
    Enable { capabilities: Vec<String> },

    Select(SelectCommand),
    Examine(SelectCommand),

    Close,
    Unselect,
    Check,
    Expunge { uid_sequence_set: Option<SequenceSet> },
    Search { uid: bool, criteria_atom: String },
    Fetch(FetchCommand),
    Store(StoreCommand),
    Copy { uid: bool, sequence_set: SequenceSet, mailbox: String },
}

impl Command {
    /// The bare command name, upper-cased, used for registry lookup and
    /// for the "Command unsupported with UID" error (§4.5, §8 property 7).
    pub fn name(&self) -> &'static str {
        match self {
            Command::Capability => "CAPABILITY",
            Command::Noop => "NOOP",
            Command::Logout => "LOGOUT",
            Command::Login { .. } => "LOGIN",
            Command::Create { .. } => "CREATE",
            Command::Delete { .. } => "DELETE",
            Command::Rename { .. } => "RENAME",
            Command::Subscribe { .. } => "SUBSCRIBE",
            Command::Unsubscribe { .. } => "UNSUBSCRIBE",
            Command::List(_) => "LIST",
            Command::Lsub(_) => "LSUB",
            Command::Status { .. } => "STATUS",
            Command::Append { .. } => "APPEND",
            Command::Enable { .. } => "ENABLE",
            Command::Select(_) => "SELECT",
            Command::Examine(_) => "EXAMINE",
            Command::Close => "CLOSE",
            Command::Unselect => "UNSELECT",
            Command::Check => "CHECK",
            Command::Expunge { .. } => "EXPUNGE",
            Command::Search { .. } => "SEARCH",
            Command::Fetch(_) => "FETCH",
            Command::Store(_) => "STORE",
            Command::Copy { .. } => "COPY",
        }
    }

    /// Whether a `UID` prefix is meaningful for this command (§4.5's
    /// `UidHandle` capability). `UID EXPUNGE` is additionally gated on
    /// the backend advertising UIDPLUS — that check lives in the
    /// registry, not here.
    pub fn supports_uid(&self) -> bool {
        matches!(
            self,
            Command::Expunge { .. } | Command::Search { .. } | Command::Fetch(_) | Command::Store(_) | Command::Copy { .. }
        )
    }
}
