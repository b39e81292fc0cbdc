//! TAUL string and charset literal syntax.
//!
//! Escape sequences: `\0 \a \b \f \n \r \t \v \' \] \- \\`, plus fixed-width
//! hex forms `\xNN`, `\uNNNN`, and `\UNNNNNNNN`. An unrecognised escape
//! literalises the escaped character, and a malformed hex escape literalises
//! its letter. Charset bodies are sequences of chars and `lo-hi` ranges; a
//! `-` at the start or end (or escaped) is literal.

/// Decode one (possibly escaped) char from the front of `x`, returning it
/// and the number of bytes consumed. `None` on empty input.
pub fn parse_char(x: &str) -> Option<(char, usize)> {
    let mut chars = x.chars();
    let first = chars.next()?;
    if first != '\\' {
        return Some((first, first.len_utf8()));
    }
    let Some(second) = chars.next() else {
        // trailing backslash literalises itself
        return Some(('\\', 1));
    };
    let basic_len = 1 + second.len_utf8();
    let decoded = match second {
        '0' => '\0',
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0C',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0B',
        '\'' => '\'',
        ']' => ']',
        '-' => '-',
        '\\' => '\\',
        'x' => return Some(parse_hex_escape(x, 'x', 2).unwrap_or(('x', basic_len))),
        'u' => return Some(parse_hex_escape(x, 'u', 4).unwrap_or(('u', basic_len))),
        'U' => return Some(parse_hex_escape(x, 'U', 8).unwrap_or(('U', basic_len))),
        // not a recognized escape: literalise
        other => other,
    };
    Some((decoded, basic_len))
}

fn parse_hex_escape(x: &str, _letter: char, digits: usize) -> Option<(char, usize)> {
    let hex = x.get(2..2 + digits)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    let cp = char::from_u32(value)?;
    Some((cp, 2 + digits))
}

/// Decode a whole string literal body.
pub fn parse_string(x: &str) -> String {
    let mut out = String::with_capacity(x.len());
    let mut rest = x;
    while let Some((cp, consumed)) = parse_char(rest) {
        out.push(cp);
        rest = &rest[consumed..];
    }
    out
}

/// Decode a charset literal body into inclusive `(low, high)` codepoint
/// pairs, one per char or `lo-hi` range, in source order.
pub fn parse_charset(x: &str) -> Vec<(char, char)> {
    // decode up-front, remembering each item's consumed byte length so an
    // escaped '-' (consumed length > 1) never acts as a range separator
    let mut items: Vec<(char, usize)> = Vec::new();
    let mut rest = x;
    while let Some((cp, consumed)) = parse_char(rest) {
        items.push((cp, consumed));
        rest = &rest[consumed..];
    }

    let mut out = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let is_range = i + 2 < items.len() && items[i + 1].0 == '-' && items[i + 1].1 == 1;
        if is_range {
            let (a, b) = (items[i].0, items[i + 2].0);
            out.push(if a <= b { (a, b) } else { (b, a) });
            i += 3;
        } else {
            out.push((items[i].0, items[i].0));
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod literals_tests {
    use super::*;

    #[test]
    fn plain_chars() {
        assert_eq!(parse_char("abc"), Some(('a', 1)));
        assert_eq!(parse_char("é"), Some(('é', 2)));
        assert_eq!(parse_char(""), None);
    }

    #[test]
    fn basic_escapes() {
        assert_eq!(parse_char("\\n"), Some(('\n', 2)));
        assert_eq!(parse_char("\\0"), Some(('\0', 2)));
        assert_eq!(parse_char("\\a"), Some(('\x07', 2)));
        assert_eq!(parse_char("\\v"), Some(('\x0B', 2)));
        assert_eq!(parse_char("\\\\"), Some(('\\', 2)));
        assert_eq!(parse_char("\\'"), Some(('\'', 2)));
        assert_eq!(parse_char("\\]"), Some((']', 2)));
        assert_eq!(parse_char("\\-"), Some(('-', 2)));
    }

    #[test]
    fn unrecognised_escapes_literalise() {
        assert_eq!(parse_char("\\q"), Some(('q', 2)));
        assert_eq!(parse_char("\\"), Some(('\\', 1)));
    }

    #[test]
    fn hex_escapes() {
        assert_eq!(parse_char("\\x41"), Some(('A', 4)));
        assert_eq!(parse_char("\\u00e9"), Some(('é', 6)));
        assert_eq!(parse_char("\\U0001F600"), Some(('😀', 10)));
    }

    #[test]
    fn malformed_hex_escapes_literalise_the_letter() {
        assert_eq!(parse_char("\\xZZ"), Some(('x', 2)));
        assert_eq!(parse_char("\\x4"), Some(('x', 2)));
        assert_eq!(parse_char("\\uD800"), Some(('u', 2))); // surrogate
    }

    #[test]
    fn string_bodies() {
        assert_eq!(parse_string("ab\\nc"), "ab\nc");
        assert_eq!(parse_string(""), "");
        assert_eq!(parse_string("\\x41\\t"), "A\t");
    }

    #[test]
    fn charset_singles_and_ranges() {
        assert_eq!(parse_charset("abc"), vec![('a', 'a'), ('b', 'b'), ('c', 'c')]);
        assert_eq!(parse_charset("a-z"), vec![('a', 'z')]);
        assert_eq!(
            parse_charset("0-9a-fA-F_"),
            vec![('0', '9'), ('a', 'f'), ('A', 'F'), ('_', '_')]
        );
    }

    #[test]
    fn charset_reversed_range_normalises() {
        assert_eq!(parse_charset("z-a"), vec![('a', 'z')]);
    }

    #[test]
    fn charset_dash_literal_at_edges() {
        assert_eq!(parse_charset("-a"), vec![('-', '-'), ('a', 'a')]);
        assert_eq!(parse_charset("a-"), vec![('a', 'a'), ('-', '-')]);
        assert_eq!(parse_charset("a\\-z"), vec![('a', 'a'), ('-', '-'), ('z', 'z')]);
    }
}
