use std::ops::Range;

use crate::sql::SqlError;

/// A left-to-right cursor over SQL text that knows which spans must not be
/// searched for placeholders: quoted literals and identifiers, comments, and
/// dollar-quoted blocks.
#[derive(Debug)]
pub struct SqlScanner<'a> {
    pub text: &'a str,
    pub position: usize,
    chars: Vec<(usize, char)>,
}

impl<'a> SqlScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            chars: text.char_indices().collect(),
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.chars.len()
    }

    pub fn current(&self) -> char {
        self.peek(0)
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.chars.get(self.position + ahead).map_or('\0', |&(_, c)| c)
    }

    pub fn advance(&mut self) {
        if !self.eof() {
            self.position += 1;
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.chars.len());
    }

    /// Byte offset of the current character.
    pub fn offset(&self) -> usize {
        self.offset_at(self.position)
    }

    fn offset_at(&self, position: usize) -> usize {
        self.chars.get(position).map_or(self.text.len(), |&(offset, _)| offset)
    }

    fn seek_offset(&mut self, offset: usize) {
        self.position = self.chars.partition_point(|&(o, _)| o < offset);
    }

    /// Consumes the skip region starting at the current character, if any,
    /// and returns its byte range.
    pub fn skip_region(&mut self) -> Result<Option<Range<usize>>, SqlError> {
        let start = self.offset();
        match (self.current(), self.peek(1)) {
            ('\'', _) => {
                if !self.skip_quoted('\'') {
                    return Err(SqlError::UnterminatedLiteral { offset: start });
                }
            }
            (quote @ ('"' | '`'), _) => {
                if !self.skip_quoted(quote) {
                    return Err(SqlError::UnterminatedIdentifier { quote, offset: start });
                }
            }
            ('-', '-') => self.skip_line_comment(),
            ('/', '*') => {
                if !self.skip_block_comment() {
                    return Err(SqlError::UnterminatedComment { offset: start });
                }
            }
            ('$', _) => match self.scan_dollar() {
                DollarScan::NotDollar => return Ok(None),
                DollarScan::Block(end) => self.seek_offset(end),
                DollarScan::Unterminated { tag } => {
                    return Err(SqlError::UnterminatedDollarBlock { tag, offset: start });
                }
            },
            _ => return Ok(None),
        }
        Ok(Some(start..self.offset()))
    }

    /// A doubled quote inside the region is an escaped quote.
    fn skip_quoted(&mut self, quote: char) -> bool {
        self.advance();
        while !self.eof() {
            let c = self.current();
            self.advance();
            if c == quote {
                if self.current() == quote && !self.eof() {
                    self.advance();
                    continue;
                }
                return true;
            }
        }
        false
    }

    /// Runs through the newline, or to the end of the text.
    fn skip_line_comment(&mut self) {
        self.jump(2);
        while !self.eof() {
            let c = self.current();
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    /// Block comments do not nest: the first `*/` closes.
    fn skip_block_comment(&mut self) -> bool {
        self.jump(2);
        while !self.eof() {
            if self.current() == '*' && self.peek(1) == '/' {
                self.jump(2);
                return true;
            }
            self.advance();
        }
        false
    }

    /// A tag never starts with a digit, so `$1$2` stays two parameters.
    fn scan_dollar(&self) -> DollarScan {
        if self.peek(1).is_ascii_digit() {
            return DollarScan::NotDollar;
        }
        let mut ahead = 1;
        while is_tag_char(self.peek(ahead)) {
            ahead += 1;
        }
        if self.peek(ahead) != '$' {
            return DollarScan::NotDollar;
        }

        let open_start = self.offset();
        let body_start = self.offset_at(self.position + ahead + 1);
        let marker = &self.text[open_start..body_start];
        match self.text[body_start..].find(marker) {
            Some(found) => DollarScan::Block(body_start + found + marker.len()),
            None => DollarScan::Unterminated { tag: marker.to_string() },
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum DollarScan {
    /// The `$` opens nothing and is an ordinary character.
    NotDollar,
    /// Byte offset just past the closing marker.
    Block(usize),
    Unterminated { tag: String },
}

fn is_tag_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
