//! FETCH parsing (§4.3), grounded on
//! `examples/original_source/commands/fetch.go`.

use crate::error::CommandError;
use crate::field::Field;

/// `ALL|FAST|FULL` macro expansion table, per §3's Fetch Item entity.
pub fn expand_fetch_items(items: Vec<String>) -> Vec<String> {
    let mut out = Vec::new();
    for item in items {
        match item.as_str() {
            "ALL" => out.extend(["FLAGS", "INTERNALDATE", "RFC822.SIZE", "ENVELOPE"].map(String::from)),
            "FAST" => out.extend(["FLAGS", "INTERNALDATE", "RFC822.SIZE"].map(String::from)),
            "FULL" => out.extend(
                ["FLAGS", "INTERNALDATE", "RFC822.SIZE", "ENVELOPE", "BODY"].map(String::from),
            ),
            other => out.push(other.to_string()),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct FetchCommand {
    pub uid: bool,
    pub sequence_set_atom: String,
    pub items: Vec<String>,
    pub changed_since: Option<u64>,
    pub enable_vanished: bool,
}

/// Parses `FETCH set (items) [(CHANGEDSINCE n [VANISHED])]`. Field 1 may
/// be a bare macro atom or a parenthesized item list; both are
/// uppercased and macro-expanded. Preserves the Go source's conservative
/// interpretation (§9(a)): a modifier list shorter than 2, or a VANISHED
/// key at position 2 without `CHANGEDSINCE` at position 0, is silently
/// ignored rather than erroring.
pub fn parse_fetch(fields: &[Field], uid: bool) -> Result<FetchCommand, CommandError> {
    let sequence_set_atom = fields
        .first()
        .and_then(Field::as_str)
        .ok_or(CommandError::NotEnoughArguments)?
        .to_string();

    let items_field = fields.get(1).ok_or(CommandError::NotEnoughArguments)?;
    let raw_items: Vec<String> = match items_field {
        Field::Atom(a) => vec![a.to_ascii_uppercase()],
        Field::List(list) => list
            .iter()
            .map(|f| f.as_str().map(|s| s.to_ascii_uppercase()))
            .collect::<Option<Vec<_>>>()
            .ok_or(CommandError::ItemMustBeString)?,
        Field::String(_) => return Err(CommandError::ItemMustBeString),
    };
    let mut items = expand_fetch_items(raw_items);

    let mut changed_since = None;
    let mut enable_vanished = false;

    if let Some(modifiers) = fields.get(2).and_then(Field::as_list) {
        if modifiers.len() >= 2 && modifiers[0].atom_eq_ignore_case("CHANGEDSINCE") {
            let n = modifiers[1]
                .as_str()
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or(CommandError::Invalid("CHANGEDSINCE value"))?;
            changed_since = Some(n);
            if !items.iter().any(|i| i == "MODSEQ") {
                items.push("MODSEQ".to_string());
            }

            if modifiers.len() >= 3 && modifiers[2].atom_eq_ignore_case("VANISHED") {
                // VANISHED is only honored on the UID variant (§4.3).
                if uid {
                    enable_vanished = true;
                }
            }
        }
        // Any other shape: silently ignored, per §9(a).
    }

    Ok(FetchCommand {
        uid,
        sequence_set_atom,
        items,
        changed_since,
        enable_vanished,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Field {
        Field::Atom(s.to_string())
    }

    #[test]
    fn macro_expansion() {
        assert_eq!(
            expand_fetch_items(vec!["FAST".into()]),
            vec!["FLAGS", "INTERNALDATE", "RFC822.SIZE"]
        );
    }

    #[test]
    fn changedsince_appends_modseq() {
        let fields = vec![
            atom("1:*"),
            Field::List(vec![atom("FLAGS")]),
            Field::List(vec![atom("CHANGEDSINCE"), atom("100")]),
        ];
        let cmd = parse_fetch(&fields, true).unwrap();
        assert_eq!(cmd.changed_since, Some(100));
        assert!(cmd.items.contains(&"MODSEQ".to_string()));
    }

    #[test]
    fn vanished_only_honored_on_uid() {
        let fields = vec![
            atom("1:*"),
            Field::List(vec![atom("FLAGS")]),
            Field::List(vec![atom("CHANGEDSINCE"), atom("100"), atom("VANISHED")]),
        ];
        let cmd = parse_fetch(&fields, false).unwrap();
        assert!(!cmd.enable_vanished);

        let cmd_uid = parse_fetch(&fields, true).unwrap();
        assert!(cmd_uid.enable_vanished);
    }

    #[test]
    fn short_modifier_list_is_ignored() {
        let fields = vec![
            atom("1:*"),
            Field::List(vec![atom("FLAGS")]),
            Field::List(vec![atom("VANISHED")]),
        ];
        let cmd = parse_fetch(&fields, true).unwrap();
        assert!(!cmd.enable_vanished);
        assert!(cmd.changed_since.is_none());
    }
}
