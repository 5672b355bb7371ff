use crate::sql::{SqlError, SqlScanner};

/// One `:name` occurrence. `start..end` spans the colon and the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameToken<'a> {
    pub name: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Finds named parameters outside skip regions, left to right, repeats
/// included. `::` is a cast and never starts a parameter.
pub fn find_named_params(query: &str) -> Result<Vec<NameToken<'_>>, SqlError> {
    let mut scanner = SqlScanner::new(query);
    let mut tokens = Vec::new();

    while !scanner.eof() {
        if scanner.skip_region()?.is_some() {
            continue;
        }
        if scanner.current() != ':' {
            scanner.advance();
            continue;
        }
        if scanner.peek(1) == ':' {
            scanner.jump(2);
            continue;
        }

        let start = scanner.offset();
        scanner.advance();
        let name_start = scanner.offset();
        while is_ident_char(scanner.current()) {
            scanner.advance();
        }
        let end = scanner.offset();
        if end > name_start {
            tokens.push(NameToken { name: &query[name_start..end], start, end });
        }
    }
    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
