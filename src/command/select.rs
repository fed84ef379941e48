//! SELECT/EXAMINE parsing (§4.3), grounded on
//! `examples/original_source/commands/select.go`.

use crate::error::CommandError;
use crate::field::Field;

/// The five QRESYNC SELECT parameters, stored positionally exactly as
/// the Go source stores them: `[uidValidity, modseq, uidSet?, knownSeqs?,
/// knownUids?]`. Lengths 2, 3 and 5 are accepted; length 4 is malformed
/// (the known-seq/known-uid pair must arrive together, nested one level
/// down as `(known-seq-set known-uid-set)`).
#[derive(Debug, Clone)]
pub struct QresyncSelectParams {
    pub uid_validity: u32,
    pub modseq: u64,
    pub uid_set: Option<String>,
    pub known_seq_set: Option<String>,
    pub known_uid_set: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SelectCommand {
    pub mailbox: String,
    pub enable_condstore: bool,
    pub qresync: Option<QresyncSelectParams>,
    pub read_only: bool,
}

/// Parses `SELECT mailbox [(CONDSTORE)]` / `SELECT mailbox [(QRESYNC
/// (...))]`. `read_only` distinguishes EXAMINE from SELECT — both route
/// through this parser (§11 supplement).
pub fn parse_select(fields: &[Field], read_only: bool) -> Result<SelectCommand, CommandError> {
    let mailbox = fields
        .first()
        .and_then(Field::as_str)
        .ok_or(CommandError::NotEnoughArguments)?
        .to_string();

    let mut cmd = SelectCommand {
        mailbox,
        enable_condstore: false,
        qresync: None,
        read_only,
    };

    let Some(modifiers) = fields.get(1).and_then(Field::as_list) else {
        return Ok(cmd);
    };
    let Some(first) = modifiers.first() else {
        return Ok(cmd);
    };

    if first.atom_eq_ignore_case("CONDSTORE") {
        cmd.enable_condstore = true;
        return Ok(cmd);
    }
    if !first.atom_eq_ignore_case("QRESYNC") {
        // Unknown modifier: accepted silently, never forwarded (§3 invariant iv).
        return Ok(cmd);
    }

    let qresync_args = modifiers
        .get(1)
        .and_then(Field::as_list)
        .ok_or(CommandError::NotEnoughArguments)?;

    if qresync_args.len() == 4 {
        return Err(CommandError::Invalid("QRESYNC parameters"));
    }
    if qresync_args.len() != 2 && qresync_args.len() != 3 && qresync_args.len() != 5 {
        return Err(CommandError::Invalid("QRESYNC parameters"));
    }

    let uid_validity = qresync_args[0]
        .as_str()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or(CommandError::Invalid("UIDVALIDITY"))?;
    let modseq = qresync_args[1]
        .as_str()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or(CommandError::Invalid("MODSEQ"))?;

    let uid_set = if qresync_args.len() >= 3 {
        Some(
            qresync_args[2]
                .as_str()
                .ok_or(CommandError::Invalid("uid-set"))?
                .to_string(),
        )
    } else {
        None
    };

    let (known_seq_set, known_uid_set) = if qresync_args.len() == 5 {
        let pair = qresync_args[3]
            .as_list()
            .ok_or(CommandError::NotEnoughArguments)?;
        if pair.len() != 2 {
            return Err(CommandError::NotEnoughArguments);
        }
        (
            Some(pair[0].as_str().ok_or(CommandError::Invalid("known-seq-set"))?.to_string()),
            Some(pair[1].as_str().ok_or(CommandError::Invalid("known-uid-set"))?.to_string()),
        )
    } else {
        (None, None)
    };

    cmd.qresync = Some(QresyncSelectParams {
        uid_validity,
        modseq,
        uid_set,
        known_seq_set,
        known_uid_set,
    });

    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Field {
        Field::Atom(s.to_string())
    }

    #[test]
    fn plain_select() {
        let fields = vec![atom("INBOX")];
        let cmd = parse_select(&fields, false).unwrap();
        assert_eq!(cmd.mailbox, "INBOX");
        assert!(!cmd.enable_condstore);
        assert!(cmd.qresync.is_none());
    }

    #[test]
    fn condstore_select() {
        let fields = vec![atom("INBOX"), Field::List(vec![atom("CONDSTORE")])];
        let cmd = parse_select(&fields, false).unwrap();
        assert!(cmd.enable_condstore);
    }

    #[test]
    fn qresync_two_params() {
        let fields = vec![
            atom("INBOX"),
            Field::List(vec![
                atom("QRESYNC"),
                Field::List(vec![atom("67890007"), atom("90060115205545359")]),
            ]),
        ];
        let cmd = parse_select(&fields, false).unwrap();
        let q = cmd.qresync.unwrap();
        assert_eq!(q.uid_validity, 67890007);
        assert_eq!(q.modseq, 90060115205545359);
        assert!(q.uid_set.is_none());
    }

    #[test]
    fn qresync_five_params() {
        let fields = vec![
            atom("INBOX"),
            Field::List(vec![
                atom("QRESYNC"),
                Field::List(vec![
                    atom("1"),
                    atom("2"),
                    atom("1:100"),
                    Field::List(vec![atom("1:50"), atom("1:50")]),
                ]),
            ]),
        ];
        let cmd = parse_select(&fields, false).unwrap();
        let q = cmd.qresync.unwrap();
        assert_eq!(q.known_seq_set.unwrap(), "1:50");
        assert_eq!(q.known_uid_set.unwrap(), "1:50");
    }

    #[test]
    fn qresync_four_params_is_malformed() {
        let fields = vec![
            atom("INBOX"),
            Field::List(vec![
                atom("QRESYNC"),
                Field::List(vec![atom("1"), atom("2"), atom("1:100"), atom("1:50")]),
            ]),
        ];
        assert!(parse_select(&fields, false).is_err());
    }

    #[test]
    fn unknown_modifier_is_ignored() {
        let fields = vec![atom("INBOX"), Field::List(vec![atom("FUTURE-EXT")])];
        let cmd = parse_select(&fields, false).unwrap();
        assert!(!cmd.enable_condstore);
        assert!(cmd.qresync.is_none());
    }
}
