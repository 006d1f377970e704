//! Read-only statement guard
//!
//! Looks at the first one or two whitespace-delimited tokens only. This is a
//! rail against accidental writes, not a security boundary: it does not parse
//! SQL.

const DELIMITERS: [char; 4] = [' ', '\t', '\r', '\n'];

/// Whether `sql` may run on a read-only connection.
///
/// `SELECT`, `SHOW` and `USE` pass; `SET` passes only as `SET NAMES`.
pub fn allows(sql: &str) -> bool {
    let mut tokens = sql.split(DELIMITERS).filter(|t| !t.is_empty());
    let Some(first) = tokens.next() else {
        return false;
    };

    if ["select", "show", "use"]
        .iter()
        .any(|kw| first.eq_ignore_ascii_case(kw))
    {
        return true;
    }

    first.eq_ignore_ascii_case("set")
        && tokens
            .next()
            .is_some_and(|sub| sub.eq_ignore_ascii_case("names"))
}
