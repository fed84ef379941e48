//! MODSEQ-bearing FETCH, VANISHED batches, and the EXPUNGE stream
//! (§4.4), grounded on
//! `examples/original_source/backend/qresync_extension.go`'s
//! `QresyncMessage.WriteTo`/`QresyncVanished.WriteTo`.

use crate::backend::MessageData;
use crate::ext::QresyncMessage;

use super::Line;

/// `* <seq> FETCH (UID u MODSEQ (m) FLAGS (...))` per message (§4.4).
pub fn modseq_fetch_lines(messages: &[MessageData]) -> Vec<Line> {
    messages
        .iter()
        .map(|m| Line::Fetch {
            seq: m.seq,
            uid: Some(m.uid),
            modseq: Some(m.modseq),
            flags: Some(m.flags.clone()),
        })
        .collect()
}

pub fn qresync_messages_lines(messages: &[&QresyncMessage]) -> Vec<Line> {
    messages.iter().map(|m| super::qresync_message_line(m)).collect()
}

/// `* n EXPUNGE` for each sequence number, in the order given. Callers
/// are responsible for the descending-order contract (§8 property 2) —
/// this function only formats what it's handed.
pub fn expunge_lines(seq_nums: &[u32]) -> Vec<Line> {
    seq_nums.iter().map(|n| Line::Expunge(*n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expunge_preserves_given_order() {
        let lines = expunge_lines(&[5, 4, 2]);
        assert_eq!(
            lines,
            vec![Line::Expunge(5), Line::Expunge(4), Line::Expunge(2)]
        );
    }
}
