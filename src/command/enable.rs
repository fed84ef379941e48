//! ENABLE parsing (§4.3), grounded on
//! `examples/original_source/commands/enable.go`.

use crate::error::CommandError;
use crate::field::Field;

/// Takes one or two capability tokens (QRESYNC, CONDSTORE).
pub fn parse_enable(fields: &[Field]) -> Result<Vec<String>, CommandError> {
    let first = fields
        .first()
        .and_then(Field::as_str)
        .ok_or(CommandError::NotEnoughArguments)?
        .to_ascii_uppercase();
    let mut caps = vec![first];
    if let Some(second) = fields.get(1).and_then(Field::as_str) {
        caps.push(second.to_ascii_uppercase());
    }
    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cap() {
        let fields = vec![Field::Atom("qresync".to_string())];
        assert_eq!(parse_enable(&fields).unwrap(), vec!["QRESYNC"]);
    }

    #[test]
    fn requires_at_least_one() {
        assert!(parse_enable(&[]).is_err());
    }
}
