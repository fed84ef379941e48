//! STORE parsing (§4.3), grounded on
//! `examples/original_source/commands/store.go`.

use crate::error::CommandError;
use crate::field::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Add,
    Remove,
    Replace,
}

#[derive(Debug, Clone)]
pub struct StoreCommand {
    pub uid: bool,
    pub sequence_set_atom: String,
    pub op: StoreOp,
    pub silent: bool,
    pub flags: Vec<String>,
    pub unchanged_since: Option<u64>,
}

/// Parses `STORE set [(UNCHANGEDSINCE m)] item value`. The item atom is
/// `(+|-)?FLAGS(.SILENT)?`; non-FLAGS items are rejected by the handler,
/// not here (the parser stays total per §4.3).
pub fn parse_store(fields: &[Field], uid: bool) -> Result<StoreCommand, CommandError> {
    let sequence_set_atom = fields
        .first()
        .and_then(Field::as_str)
        .ok_or(CommandError::NotEnoughArguments)?
        .to_string();

    let field1 = fields.get(1).ok_or(CommandError::NotEnoughArguments)?;

    let (unchanged_since, item_field, value_field) = if let Some(list) = field1.as_list() {
        if list.len() != 2 || !list[0].atom_eq_ignore_case("UNCHANGEDSINCE") {
            return Err(CommandError::Invalid("STORE modifier"));
        }
        let n = list[1]
            .as_str()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or(CommandError::Invalid("UNCHANGEDSINCE value"))?;
        let item = fields.get(2).ok_or(CommandError::NotEnoughArguments)?;
        let value = fields.get(3).ok_or(CommandError::NotEnoughArguments)?;
        (Some(n), item, value)
    } else {
        let value = fields.get(2).ok_or(CommandError::NotEnoughArguments)?;
        (None, field1, value)
    };

    let item_str = item_field
        .as_str()
        .ok_or(CommandError::ItemMustBeString)?
        .to_ascii_uppercase();

    let (op, rest) = if let Some(r) = item_str.strip_prefix('+') {
        (StoreOp::Add, r)
    } else if let Some(r) = item_str.strip_prefix('-') {
        (StoreOp::Remove, r)
    } else {
        (StoreOp::Replace, item_str.as_str())
    };

    let (base, silent) = if let Some(r) = rest.strip_suffix(".SILENT") {
        (r, true)
    } else {
        (rest, false)
    };

    if base != "FLAGS" {
        return Err(CommandError::Invalid("STORE item"));
    }

    let flags = match value_field {
        Field::Atom(a) | Field::String(a) => vec![a.clone()],
        Field::List(list) => list
            .iter()
            .map(|f| f.as_str().map(String::from))
            .collect::<Option<Vec<_>>>()
            .ok_or(CommandError::ItemMustBeString)?,
    };

    Ok(StoreCommand {
        uid,
        sequence_set_atom,
        op,
        silent,
        flags,
        unchanged_since,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Field {
        Field::Atom(s.to_string())
    }

    #[test]
    fn plain_store() {
        let fields = vec![atom("1:5"), atom("+FLAGS.SILENT"), Field::List(vec![atom("\\Seen")])];
        let cmd = parse_store(&fields, false).unwrap();
        assert_eq!(cmd.op, StoreOp::Add);
        assert!(cmd.silent);
        assert_eq!(cmd.flags, vec!["\\Seen"]);
        assert!(cmd.unchanged_since.is_none());
    }

    #[test]
    fn unchangedsince_store() {
        let fields = vec![
            atom("1:5"),
            Field::List(vec![atom("UNCHANGEDSINCE"), atom("42")]),
            atom("FLAGS"),
            Field::List(vec![atom("\\Deleted")]),
        ];
        let cmd = parse_store(&fields, true).unwrap();
        assert_eq!(cmd.unchanged_since, Some(42));
        assert_eq!(cmd.op, StoreOp::Replace);
    }

    #[test]
    fn rejects_non_flags_item() {
        let fields = vec![atom("1:5"), atom("ENVELOPE"), Field::List(vec![atom("x")])];
        assert!(parse_store(&fields, false).is_err());
    }
}
