//! LIST/LSUB parsing (§4.3), grounded on
//! `examples/original_source/commands/list.go`. Mailbox-name UTF-7
//! decoding and canonicalization are delegated to an external helper
//! (§1 Out of scope); this parser works on already-decoded strings.

use std::collections::HashMap;

use crate::error::CommandError;
use crate::field::Field;

#[derive(Debug, Clone)]
pub struct ListCommand {
    pub reference: String,
    pub mailbox: String,
    /// Uppercased RETURN option keys mapped to their optional
    /// parenthesized value list, e.g. `STATUS (X-GUID)`.
    pub return_opts: HashMap<String, Vec<String>>,
}

pub fn parse_list(fields: &[Field]) -> Result<ListCommand, CommandError> {
    let reference = fields
        .first()
        .and_then(Field::as_str)
        .ok_or(CommandError::NotEnoughArguments)?
        .to_string();
    let mailbox = fields
        .get(1)
        .and_then(Field::as_str)
        .ok_or(CommandError::NotEnoughArguments)?
        .to_string();

    let mut return_opts = HashMap::new();
    if fields.len() > 3 && fields[2].atom_eq_ignore_case("RETURN") {
        let opts = fields.get(3).and_then(Field::as_list).ok_or(CommandError::NotEnoughArguments)?;
        let mut i = 0;
        while i < opts.len() {
            let key = opts[i].as_str().ok_or(CommandError::Invalid("RETURN key"))?.to_ascii_uppercase();
            let value = if let Some(next) = opts.get(i + 1).and_then(Field::as_list) {
                i += 1;
                next.iter().filter_map(Field::as_str).map(String::from).collect()
            } else {
                Vec::new()
            };
            return_opts.insert(key, value);
            i += 1;
        }
    }

    Ok(ListCommand {
        reference,
        mailbox,
        return_opts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Field {
        Field::Atom(s.to_string())
    }

    #[test]
    fn plain_list() {
        let fields = vec![atom(""), atom("*")];
        let cmd = parse_list(&fields).unwrap();
        assert_eq!(cmd.mailbox, "*");
        assert!(cmd.return_opts.is_empty());
    }

    #[test]
    fn list_with_return_status() {
        let fields = vec![
            atom(""),
            atom("*"),
            atom("RETURN"),
            Field::List(vec![atom("STATUS"), Field::List(vec![atom("X-GUID")])]),
        ];
        let cmd = parse_list(&fields).unwrap();
        assert_eq!(cmd.return_opts.get("STATUS").unwrap(), &vec!["X-GUID".to_string()]);
    }
}
