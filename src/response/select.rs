//! SELECT/EXAMINE bootstrap response, grounded on
//! `examples/original_source/responses/select.go`'s `WriteTo` ordering
//! and `examples/deuxfleurs-org-aerogramme/aero-proto/src/imap/mailbox_view.rs`'s
//! `summary()` status helpers.

use crate::backend::{MailboxStatus, StatusItem};

use super::Line;

/// Builds the ordered line sequence for a full SELECT/EXAMINE response:
/// FLAGS → PERMANENTFLAGS → UNSEEN → per-requested-item
/// (EXISTS/RECENT/UIDNEXT/UIDVALIDITY/HIGHESTMODSEQ-or-NOMODSEQ) (§4.4, §5).
pub fn select_response_lines(status: &MailboxStatus) -> Vec<Line> {
    let mut lines = Vec::new();

    lines.push(Line::Flags(status.flags.clone()));

    lines.push(Line::OkCode {
        code: format!("PERMANENTFLAGS ({})", status.permanent_flags.join(" ")),
        text: "Flags permitted".to_string(),
    });

    if status.unseen_seq_num > 0 {
        lines.push(Line::OkCode {
            code: format!("UNSEEN {}", status.unseen_seq_num),
            text: "Message is first unseen".to_string(),
        });
    }

    if status.items.contains(&StatusItem::Messages) {
        lines.push(Line::Exists(status.messages));
    }
    if status.items.contains(&StatusItem::Recent) {
        lines.push(Line::Recent(status.recent));
    }
    if status.items.contains(&StatusItem::UidNext) {
        lines.push(Line::OkCode {
            code: format!("UIDNEXT {}", status.uid_next),
            text: "Predicted next UID".to_string(),
        });
    }
    if status.items.contains(&StatusItem::UidValidity) {
        lines.push(Line::OkCode {
            code: format!("UIDVALIDITY {}", status.uid_validity),
            text: "UIDs valid".to_string(),
        });
    }
    if status.items.contains(&StatusItem::HighestModseq) {
        if status.highest_modseq > 0 {
            lines.push(Line::OkCode {
                code: format!("HIGHESTMODSEQ {}", status.highest_modseq),
                text: "Highest".to_string(),
            });
        } else {
            // §3 invariant (vi).
            lines.push(Line::OkCode {
                code: "NOMODSEQ".to_string(),
                text: "Sorry, this mailbox format doesn't support modsequences".to_string(),
            });
        }
    }

    lines
}

/// Builds the truncated SELECT response APPEND emits when the target
/// mailbox equals the currently selected one and the backend doesn't
/// broadcast updates itself — only the new MESSAGES count (§4.6 APPEND).
pub fn truncated_select_exists(messages: u32) -> Vec<Line> {
    vec![Line::Exists(messages)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty_mailbox_condstore_ordering() {
        let mut items = HashSet::new();
        items.insert(StatusItem::Messages);
        items.insert(StatusItem::Recent);
        items.insert(StatusItem::UidNext);
        items.insert(StatusItem::UidValidity);
        items.insert(StatusItem::HighestModseq);

        let status = MailboxStatus {
            flags: vec!["\\Seen".into(), "\\Deleted".into()],
            permanent_flags: vec!["\\*".into()],
            unseen_seq_num: 0,
            messages: 0,
            recent: 0,
            uid_next: 1,
            uid_validity: 1,
            highest_modseq: 0,
            read_only: false,
            items,
        };

        let lines = select_response_lines(&status);
        assert!(matches!(lines[0], Line::Flags(_)));
        assert!(matches!(&lines[1], Line::OkCode { code, .. } if code.starts_with("PERMANENTFLAGS")));
        // No UNSEEN line since unseen_seq_num == 0.
        assert!(matches!(lines[2], Line::Exists(0)));
        assert!(matches!(lines[3], Line::Recent(0)));
        assert!(matches!(&lines[4], Line::OkCode { code, .. } if code == "UIDNEXT 1"));
        assert!(matches!(&lines[5], Line::OkCode { code, .. } if code == "UIDVALIDITY 1"));
        assert!(matches!(&lines[6], Line::OkCode { code, .. } if code == "NOMODSEQ"));
    }
}
