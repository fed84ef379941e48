//! Sequence sets: an ordered list of inclusive `u32` ranges, with `*`
//! standing for "the current maximum" at parse time (the caller resolves
//! `*` before constructing a [`SequenceSet`], since only the handler
//! knows the mailbox's current size).

use crate::error::CommandError;

/// One inclusive range within a sequence set. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqRange {
    pub start: u32,
    pub end: u32,
}

impl SeqRange {
    pub fn single(n: u32) -> Self {
        Self { start: n, end: n }
    }

    pub fn contains(&self, id: u32) -> bool {
        id >= self.start && id <= self.end
    }
}

/// An ordered, immutable-after-parse list of inclusive ranges over `u32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSet {
    ranges: Vec<SeqRange>,
}

impl SequenceSet {
    pub fn from_ranges(ranges: Vec<SeqRange>) -> Self {
        Self { ranges }
    }

    pub fn single(n: u32) -> Self {
        Self {
            ranges: vec![SeqRange::single(n)],
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ranges.iter().any(|r| r.contains(id))
    }

    pub fn ranges(&self) -> &[SeqRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Renders back to wire form, e.g. `"2:4,8"`.
    pub fn to_wire_string(&self) -> String {
        self.ranges
            .iter()
            .map(|r| {
                if r.start == r.end {
                    r.start.to_string()
                } else {
                    format!("{}:{}", r.start, r.end)
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parses a sequence-set atom such as `"1:5,8,12:*"`. `max` resolves
    /// any `*` token to the mailbox's current maximum (message count or
    /// UID-next, depending on caller context); if `max` is `0` and `*`
    /// appears, the token resolves to `0` (an empty mailbox has no
    /// messages to denote).
    pub fn parse(atom: &str, max: u32) -> Result<Self, CommandError> {
        if atom.is_empty() {
            return Err(CommandError::InvalidSequenceSet);
        }
        let mut ranges = Vec::new();
        for part in atom.split(',') {
            if part.is_empty() {
                return Err(CommandError::InvalidSequenceSet);
            }
            if let Some((a, b)) = part.split_once(':') {
                let start = parse_seq_num(a, max)?;
                let end = parse_seq_num(b, max)?;
                let (start, end) = if start <= end {
                    (start, end)
                } else {
                    (end, start)
                };
                ranges.push(SeqRange { start, end });
            } else {
                let n = parse_seq_num(part, max)?;
                ranges.push(SeqRange::single(n));
            }
        }
        Ok(Self { ranges })
    }
}

fn parse_seq_num(s: &str, max: u32) -> Result<u32, CommandError> {
    if s == "*" {
        Ok(max)
    } else {
        s.parse::<u32>().map_err(|_| CommandError::InvalidSequenceSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_list() {
        let s = SequenceSet::parse("1,3,5", 10).unwrap();
        assert!(s.contains(1));
        assert!(!s.contains(2));
        assert!(s.contains(3));
    }

    #[test]
    fn parses_ranges_and_star() {
        let s = SequenceSet::parse("2:4,8:*", 10).unwrap();
        assert!(s.contains(2) && s.contains(3) && s.contains(4));
        assert!(!s.contains(5));
        assert!(s.contains(8) && s.contains(10));
    }

    #[test]
    fn rejects_garbage() {
        assert!(SequenceSet::parse("", 10).is_err());
        assert!(SequenceSet::parse("a:b", 10).is_err());
        assert!(SequenceSet::parse("1,,2", 10).is_err());
    }

    #[test]
    fn reversed_range_is_normalized() {
        let s = SequenceSet::parse("4:2", 10).unwrap();
        assert!(s.contains(2) && s.contains(3) && s.contains(4));
    }
}
