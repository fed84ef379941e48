//! Response Emitters (§4.4): builders for the untagged/tagged response
//! sequences each command handler produces. Byte-level serialization of
//! these structured lines onto the wire is an external collaborator
//! (§1 "response serialization for primitive types" is out of scope) —
//! this module's job stops at producing an ordered, typed
//! [`Response`], which an embedder hands to its own writer (or, in the
//! demo binary, to `imap-codec`'s encoder).

pub mod fetch;
pub mod select;

use crate::ext::QresyncMessage;

/// One untagged (`*`-prefixed) response line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Flags(Vec<String>),
    Exists(u32),
    Recent(u32),
    Expunge(u32),
    OkCode { code: String, text: String },
    Vanished { sequence_set: String, earlier: bool },
    Fetch { seq: u32, uid: Option<u32>, modseq: Option<u64>, flags: Option<Vec<String>> },
    Search { ids: Vec<u32>, modseq: Option<u64> },
    ListEntry { attributes: Vec<String>, delimiter: char, name: String },
    StatusReply { mailbox: String, items: Vec<(String, u64)> },
    Enabled { capabilities: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    No,
    Bad,
}

/// The tagged completion plus every untagged line emitted before it, in
/// emission order (§5 "Untagged responses emitted within a single
/// command are preserved in handler-emission order").
#[derive(Debug, Clone)]
pub struct Response {
    pub lines: Vec<Line>,
    pub tag: String,
    pub status: Status,
    pub code: Option<String>,
    pub message: String,
}

impl Response {
    pub fn builder(tag: impl Into<String>) -> ResponseBuilder {
        ResponseBuilder {
            lines: Vec::new(),
            tag: tag.into(),
        }
    }
}

pub struct ResponseBuilder {
    lines: Vec<Line>,
    tag: String,
}

impl ResponseBuilder {
    pub fn line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = Line>) -> Self {
        self.lines.extend(lines);
        self
    }

    pub fn ok(self, code: Option<String>, message: impl Into<String>) -> Response {
        Response {
            lines: self.lines,
            tag: self.tag,
            status: Status::Ok,
            code,
            message: message.into(),
        }
    }

    pub fn no(self, code: Option<String>, message: impl Into<String>) -> Response {
        Response {
            lines: self.lines,
            tag: self.tag,
            status: Status::No,
            code,
            message: message.into(),
        }
    }

    pub fn bad(self, message: impl Into<String>) -> Response {
        Response {
            lines: self.lines,
            tag: self.tag,
            status: Status::Bad,
            code: None,
            message: message.into(),
        }
    }
}

/// Formats a QRESYNC VANISHED line, per §4.4. `EARLIER` only appears
/// when the backend marked the batch as such (pre-HIGHESTMODSEQ
/// resync data, never the live feed).
pub fn vanished_line(sequence_set: String, earlier: bool) -> Line {
    Line::Vanished { sequence_set, earlier }
}

/// Builds the `* n FETCH (UID u MODSEQ (m) FLAGS (...))` line for one
/// QRESYNC resync message (§4.4, §9(b): MODSEQ is a bare decimal inside
/// parens, not a quoted atom).
pub fn qresync_message_line(msg: &QresyncMessage) -> Line {
    Line::Fetch {
        seq: msg.seq,
        uid: Some(msg.uid),
        modseq: Some(msg.modseq),
        flags: Some(msg.flags.clone()),
    }
}
