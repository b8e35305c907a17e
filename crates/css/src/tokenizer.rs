//! CSS Tokenizer
//!
//! Tokenizes selector text following CSS Syntax Module Level 3, minus the
//! token kinds that can never appear in a selector (urls, at-keywords,
//! percentages).

use crate::error::{CssError, CssResult, SourceLocation};

/// CSS Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (e.g., type names, class names)
    Ident(String),
    /// Function token (identifier followed by '(')
    Function(String),
    /// Hash token (e.g., #id)
    Hash(String, HashType),
    /// String token
    String(String),
    /// Number, kept as its source text
    Number(String),
    /// Dimension (number with unit), kept as its source text
    Dimension(String),
    /// Whitespace (and comments)
    Whitespace,
    /// Colon ':'
    Colon,
    /// Comma ','
    Comma,
    /// Left bracket '['
    LeftBracket,
    /// Right bracket ']'
    RightBracket,
    /// Left paren '('
    LeftParen,
    /// Right paren ')'
    RightParen,
    /// Delim (any other single character)
    Delim(char),
    /// End of input
    Eof,
}

/// Hash token type (id or unrestricted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// Valid as an ID selector
    Id,
    /// Starts with a digit; not a valid ID selector
    Unrestricted,
}

/// CSS Tokenizer
pub struct Tokenizer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get the current source location
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.position)
    }

    /// Byte offset just past the last consumed character
    pub fn position(&self) -> usize {
        self.position
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut iter = self.input[self.position..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip a comment if one starts here
    fn consume_comment(&mut self) -> bool {
        if self.peek() == Some('/') && self.peek_second() == Some('*') {
            self.advance();
            self.advance();

            loop {
                match self.advance() {
                    Some('*') if self.peek() == Some('/') => {
                        self.advance();
                        return true;
                    }
                    Some(_) => continue,
                    None => return true,
                }
            }
        }
        false
    }

    /// Get the next token
    pub fn next_token(&mut self) -> CssResult<Token> {
        let mut saw_whitespace = false;
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    saw_whitespace = true;
                    self.advance();
                }
                Some('/') if self.consume_comment() => {}
                _ => break,
            }
        }

        if saw_whitespace {
            return Ok(Token::Whitespace);
        }

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let single = match c {
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '[' => Some(Token::LeftBracket),
            ']' => Some(Token::RightBracket),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        match c {
            '"' | '\'' => self.consume_string(c),
            '#' => Ok(self.consume_hash()),
            '0'..='9' => Ok(self.consume_number()),
            '.' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => Ok(self.consume_number()),
            '+' | '-' if self.peek_second().is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                Ok(self.consume_number())
            }
            _ if self.starts_identifier() => Ok(self.consume_ident_like()),
            _ => {
                self.advance();
                Ok(Token::Delim(c))
            }
        }
    }

    /// Check if input starts an identifier
    fn starts_identifier(&self) -> bool {
        let mut chars = self.input[self.position..].chars();
        match chars.next() {
            Some('-') => match chars.next() {
                Some(c) if is_ident_start(c) => true,
                Some('-') => true,
                Some('\\') => chars.next().is_some_and(|c| c != '\n'),
                _ => false,
            },
            Some('\\') => chars.next().is_some_and(|c| c != '\n'),
            Some(c) => is_ident_start(c),
            None => false,
        }
    }

    fn consume_string(&mut self, quote: char) -> CssResult<Token> {
        let start = self.location();
        self.advance();
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(Token::String(value)),
                Some('\\') => match self.peek() {
                    Some('\n') => {
                        self.advance();
                    }
                    Some(_) => value.push(self.consume_escape()),
                    None => {}
                },
                Some('\n') | None => {
                    return Err(CssError::UnterminatedString { location: start });
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn consume_hash(&mut self) -> Token {
        self.advance(); // consume '#'
        let hash_type = if self.starts_identifier() {
            HashType::Id
        } else {
            HashType::Unrestricted
        };
        Token::Hash(self.consume_ident_name(), hash_type)
    }

    /// Consume the rest of an escape after the backslash
    ///
    /// Up to six hex digits name a code point, optionally followed by one
    /// whitespace character; NUL, surrogates and values past U+10FFFF become
    /// U+FFFD. Anything else escapes itself.
    fn consume_escape(&mut self) -> char {
        let mut digits = String::new();
        while digits.len() < 6 {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.advance();
                }
                _ => break,
            }
        }

        if digits.is_empty() {
            return self.advance().unwrap_or('\u{FFFD}');
        }

        if self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.advance();
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .filter(|&cp| cp != 0)
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}')
    }

    /// Consume an identifier name, resolving escapes
    fn consume_ident_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                name.push(c);
                self.advance();
            } else if c == '\\' && self.peek_second().is_some_and(|n| n != '\n') {
                self.advance();
                name.push(self.consume_escape());
            } else {
                break;
            }
        }
        name
    }

    fn consume_ident_like(&mut self) -> Token {
        let name = self.consume_ident_name();

        if self.peek() == Some('(') {
            self.advance();
            return Token::Function(name);
        }

        Token::Ident(name)
    }

    fn consume_number(&mut self) -> Token {
        let start = self.position;

        if matches!(self.peek(), Some('+' | '-')) {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.starts_identifier() {
            self.consume_ident_name();
            return Token::Dimension(self.input[start..self.position].to_string());
        }

        Token::Number(self.input[start..self.position].to_string())
    }

    /// Tokenize all remaining input
    pub fn tokenize_all(&mut self) -> CssResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Check if character can start an identifier
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c > '\x7F'
}

/// Check if character can be part of an identifier
fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Tokenizer::new(input).tokenize_all().unwrap()
    }

    #[test]
    fn test_class_selector() {
        let tokens = tokenize(".box");
        assert_eq!(tokens, vec![Token::Delim('.'), Token::Ident("box".into())]);
    }

    #[test]
    fn test_id_selector() {
        let tokens = tokenize("#hero");
        assert_eq!(tokens, vec![Token::Hash("hero".into(), HashType::Id)]);
    }

    #[test]
    fn test_digit_hash_is_unrestricted() {
        let tokens = tokenize("#1a");
        assert_eq!(tokens, vec![Token::Hash("1a".into(), HashType::Unrestricted)]);
    }

    #[test]
    fn test_combinators() {
        let tokens = tokenize("div > p + a ~ span");
        assert!(tokens.contains(&Token::Delim('>')));
        assert!(tokens.contains(&Token::Delim('+')));
        assert!(tokens.contains(&Token::Delim('~')));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Whitespace).count(), 6);
    }

    #[test]
    fn test_attribute_selector() {
        let tokens = tokenize(r#"input[type="text"]"#);
        assert_eq!(
            tokens,
            vec![
                Token::Ident("input".into()),
                Token::LeftBracket,
                Token::Ident("type".into()),
                Token::Delim('='),
                Token::String("text".into()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_pseudo_class_function() {
        let tokens = tokenize("li:nth-child(2n+1)");
        assert_eq!(tokens[1], Token::Colon);
        assert_eq!(tokens[2], Token::Function("nth-child".into()));
        assert_eq!(tokens[3], Token::Dimension("2n".into()));
        assert_eq!(tokens[4], Token::Number("+1".into()));
        assert_eq!(tokens[5], Token::RightParen);
    }

    #[test]
    fn test_hyphenated_ident() {
        let tokens = tokenize("-webkit-box --custom");
        assert_eq!(tokens[0], Token::Ident("-webkit-box".into()));
        assert_eq!(tokens[2], Token::Ident("--custom".into()));
    }

    #[test]
    fn test_escaped_ident() {
        let tokens = tokenize(r".a\:b");
        assert_eq!(tokens[1], Token::Ident("a:b".into()));
    }

    #[test]
    fn test_hex_escapes() {
        assert_eq!(tokenize(r"#\78"), vec![Token::Hash("x".into(), HashType::Id)]);
        // One trailing space belongs to the escape
        assert_eq!(tokenize(r".\31 a"), vec![Token::Delim('.'), Token::Ident("1a".into())]);
        assert_eq!(tokenize(r".a\000062"), vec![Token::Delim('.'), Token::Ident("ab".into())]);
        assert_eq!(tokenize(r".\0"), vec![Token::Delim('.'), Token::Ident("\u{FFFD}".into())]);
        assert_eq!(tokenize(r#"[title="\41 B"]"#)[3], Token::String("AB".into()));
    }

    #[test]
    fn test_comment_is_whitespace() {
        let tokens = tokenize("div/* note */p");
        assert_eq!(tokens, vec![Token::Ident("div".into()), Token::Ident("p".into())]);

        let tokens = tokenize("div /* note */ p");
        assert_eq!(tokens[1], Token::Whitespace);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Tokenizer::new("[title=\"open").tokenize_all().unwrap_err();
        assert!(matches!(err, CssError::UnterminatedString { .. }));
    }

    #[test]
    fn test_position_tracks_bytes() {
        let mut tokenizer = Tokenizer::new(":not(.a)");
        tokenizer.next_token().unwrap();
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.position(), 5);
    }
}
