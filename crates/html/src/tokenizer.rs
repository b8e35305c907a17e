//! Markup tokenizer
//!
//! A trimmed HTML5 tokenizer state machine. Fragments have no doctype or
//! raw-text handling worth modelling, so declarations other than comments
//! are skipped.

use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::entities::{decode_entity, decode_numeric};

type Attributes = SmallVec<[(String, String); 4]>;

/// A markup token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Attributes,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Character(char),
    Comment(String),
    /// End of input
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Data,
    TagOpen,
    EndTagOpen,
    TagName,
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueQuoted(char),
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
    MarkupDeclarationOpen,
    Comment,
    BogusComment,
    SkipDeclaration,
}

/// Tag under construction
#[derive(Debug, Default)]
struct PendingTag {
    name: String,
    is_end: bool,
    self_closing: bool,
    attributes: Attributes,
    attr_name: String,
    attr_value: String,
}

impl PendingTag {
    fn start(is_end: bool) -> Self {
        Self { is_end, ..Self::default() }
    }

    /// Commit the attribute being read; the first occurrence of a name wins
    fn commit_attribute(&mut self) {
        let name = std::mem::take(&mut self.attr_name).to_ascii_lowercase();
        let value = std::mem::take(&mut self.attr_value);
        if name.is_empty() || self.attributes.iter().any(|(n, _)| *n == name) {
            return;
        }
        self.attributes.push((name, value));
    }

    fn into_token(self) -> Token {
        if self.is_end {
            Token::EndTag { name: self.name }
        } else {
            Token::StartTag {
                name: self.name,
                attributes: self.attributes,
                self_closing: self.self_closing,
            }
        }
    }
}

/// Markup tokenizer
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    state: State,
    pending: VecDeque<Token>,
    tag: PendingTag,
    comment: String,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            state: State::Data,
            pending: VecDeque::new(),
            tag: PendingTag::default(),
            comment: String::new(),
        }
    }

    /// Next token; `Token::Eof` forever once input runs out
    pub fn next_token(&mut self) -> Token {
        while self.pending.is_empty() {
            if self.pos >= self.input.len() {
                self.finish();
                break;
            }
            self.step();
        }
        self.pending.pop_front().unwrap_or(Token::Eof)
    }

    /// Every token up to (not including) EOF
    pub fn tokenize_all(mut self) -> Vec<Token> {
        std::iter::from_fn(|| match self.next_token() {
            Token::Eof => None,
            token => Some(token),
        })
        .collect()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Whether the input continues with `s`, ignoring ASCII case
    fn lookahead_is(&self, s: &str) -> bool {
        let n = s.chars().count();
        self.input.len() >= self.pos + n
            && self.input[self.pos..self.pos + n]
                .iter()
                .zip(s.chars())
                .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    }

    fn push(&mut self, token: Token) {
        self.pending.push_back(token);
    }

    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            self.push(Token::Character(c));
        }
    }

    fn finish_tag(&mut self) {
        let tag = std::mem::take(&mut self.tag);
        self.push(tag.into_token());
        self.state = State::Data;
    }

    fn finish_comment(&mut self) {
        let text = std::mem::take(&mut self.comment);
        self.push(Token::Comment(text));
        self.state = State::Data;
    }

    /// Flush whatever is pending when input runs out mid-construct
    fn finish(&mut self) {
        match self.state {
            State::TagOpen => self.push_text("<"),
            State::EndTagOpen => self.push_text("</"),
            State::Comment | State::BogusComment => self.finish_comment(),
            // Half-read tags are discarded
            _ => {}
        }
        self.state = State::Data;
        self.push(Token::Eof);
    }

    fn step(&mut self) {
        match self.state {
            State::Data => self.in_data(),
            State::TagOpen => self.in_tag_open(),
            State::EndTagOpen => self.in_end_tag_open(),
            State::TagName => self.in_tag_name(),
            State::BeforeAttributeName => self.before_attribute_name(),
            State::AttributeName => self.in_attribute_name(),
            State::AfterAttributeName => self.after_attribute_name(),
            State::BeforeAttributeValue => self.before_attribute_value(),
            State::AttributeValueQuoted(quote) => self.in_quoted_value(quote),
            State::AttributeValueUnquoted => self.in_unquoted_value(),
            State::AfterAttributeValueQuoted => self.after_quoted_value(),
            State::SelfClosingStartTag => self.in_self_closing(),
            State::MarkupDeclarationOpen => self.in_markup_declaration(),
            State::Comment => self.in_comment(),
            State::BogusComment => self.in_bogus_comment(),
            State::SkipDeclaration => {
                if self.bump() == Some('>') {
                    self.state = State::Data;
                }
            }
        }
    }

    fn in_data(&mut self) {
        match self.bump() {
            Some('<') => self.state = State::TagOpen,
            Some('&') => {
                let text = self.char_reference().unwrap_or_else(|| "&".to_string());
                self.push_text(&text);
            }
            Some(c) => self.push(Token::Character(c)),
            None => {}
        }
    }

    fn in_tag_open(&mut self) {
        match self.peek() {
            Some('!') => {
                self.bump();
                self.state = State::MarkupDeclarationOpen;
            }
            Some('/') => {
                self.bump();
                self.state = State::EndTagOpen;
            }
            Some(c) if c.is_ascii_alphabetic() => {
                self.tag = PendingTag::start(false);
                self.state = State::TagName;
            }
            Some('?') => self.start_bogus_comment(),
            _ => {
                self.push_text("<");
                self.state = State::Data;
            }
        }
    }

    fn in_end_tag_open(&mut self) {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.tag = PendingTag::start(true);
                self.state = State::TagName;
            }
            Some('>') => {
                // `</>` is dropped entirely
                self.bump();
                self.state = State::Data;
            }
            _ => self.start_bogus_comment(),
        }
    }

    fn start_bogus_comment(&mut self) {
        self.comment.clear();
        self.state = State::BogusComment;
    }

    fn in_tag_name(&mut self) {
        match self.bump() {
            Some(c) if is_html_space(c) => self.state = State::BeforeAttributeName,
            Some('/') => self.state = State::SelfClosingStartTag,
            Some('>') => self.finish_tag(),
            Some(c) => self.tag.name.push(c.to_ascii_lowercase()),
            None => {}
        }
    }

    fn before_attribute_name(&mut self) {
        match self.peek() {
            Some(c) if is_html_space(c) => {
                self.bump();
            }
            Some('/' | '>') | None => self.state = State::AfterAttributeName,
            Some('=') => {
                // A leading `=` becomes part of the name
                self.bump();
                self.tag.attr_name.push('=');
                self.state = State::AttributeName;
            }
            Some(_) => self.state = State::AttributeName,
        }
    }

    fn in_attribute_name(&mut self) {
        match self.peek() {
            Some('=') => {
                self.bump();
                self.state = State::BeforeAttributeValue;
            }
            Some(c) if !is_html_space(c) && c != '/' && c != '>' => {
                self.bump();
                self.tag.attr_name.push(c);
            }
            _ => self.state = State::AfterAttributeName,
        }
    }

    fn after_attribute_name(&mut self) {
        let Some(c) = self.peek() else { return };
        if is_html_space(c) {
            self.bump();
            return;
        }
        match c {
            '=' => {
                self.bump();
                self.state = State::BeforeAttributeValue;
            }
            '/' => {
                self.bump();
                self.tag.commit_attribute();
                self.state = State::SelfClosingStartTag;
            }
            '>' => {
                self.bump();
                self.tag.commit_attribute();
                self.finish_tag();
            }
            _ => {
                self.tag.commit_attribute();
                self.state = State::AttributeName;
            }
        }
    }

    fn before_attribute_value(&mut self) {
        match self.peek() {
            Some(c) if is_html_space(c) => {
                self.bump();
            }
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.state = State::AttributeValueQuoted(quote);
            }
            Some('>') => {
                self.bump();
                self.tag.commit_attribute();
                self.finish_tag();
            }
            _ => self.state = State::AttributeValueUnquoted,
        }
    }

    fn in_quoted_value(&mut self, quote: char) {
        match self.bump() {
            Some(c) if c == quote => {
                self.tag.commit_attribute();
                self.state = State::AfterAttributeValueQuoted;
            }
            Some('&') => self.value_reference(),
            Some(c) => self.tag.attr_value.push(c),
            None => {}
        }
    }

    fn in_unquoted_value(&mut self) {
        match self.bump() {
            Some(c) if is_html_space(c) => {
                self.tag.commit_attribute();
                self.state = State::BeforeAttributeName;
            }
            Some('>') => {
                self.tag.commit_attribute();
                self.finish_tag();
            }
            Some('&') => self.value_reference(),
            Some(c) => self.tag.attr_value.push(c),
            None => {}
        }
    }

    /// Character reference inside an attribute value
    fn value_reference(&mut self) {
        match self.char_reference() {
            Some(text) => self.tag.attr_value.push_str(&text),
            None => self.tag.attr_value.push('&'),
        }
    }

    fn after_quoted_value(&mut self) {
        match self.peek() {
            Some('/') => {
                self.bump();
                self.state = State::SelfClosingStartTag;
            }
            Some('>') => {
                self.bump();
                self.finish_tag();
            }
            Some(c) => {
                if is_html_space(c) {
                    self.bump();
                }
                self.state = State::BeforeAttributeName;
            }
            None => {}
        }
    }

    fn in_self_closing(&mut self) {
        match self.peek() {
            Some('>') => {
                self.bump();
                self.tag.self_closing = true;
                self.finish_tag();
            }
            Some(_) => self.state = State::BeforeAttributeName,
            None => {}
        }
    }

    fn in_markup_declaration(&mut self) {
        if self.lookahead_is("--") {
            self.pos += 2;
            self.comment.clear();
            self.state = State::Comment;
        } else if self.lookahead_is("doctype") {
            self.state = State::SkipDeclaration;
        } else {
            self.start_bogus_comment();
        }
    }

    fn in_comment(&mut self) {
        if self.lookahead_is("-->") {
            self.pos += 3;
            self.finish_comment();
        } else if let Some(c) = self.bump() {
            self.comment.push(c);
        }
    }

    fn in_bogus_comment(&mut self) {
        match self.bump() {
            Some('>') => self.finish_comment(),
            Some(c) => self.comment.push(c),
            None => {}
        }
    }

    /// Decode a character reference after `&`, rewinding if there is none
    fn char_reference(&mut self) -> Option<String> {
        let start = self.pos;
        let mut body = String::new();
        let mut terminated = false;

        while let Some(c) = self.peek() {
            if c == ';' {
                self.bump();
                terminated = true;
                break;
            }
            if !(c.is_ascii_alphanumeric() || (c == '#' && body.is_empty())) {
                break;
            }
            body.push(c);
            self.bump();
        }

        let decoded = match body.strip_prefix('#') {
            Some(numeric) => decode_numeric(numeric).map(String::from),
            None if terminated => decode_entity(&body).map(String::from),
            None => None,
        };

        if decoded.is_none() {
            self.pos = start;
        }
        decoded
    }
}

/// HTML whitespace: tab, LF, FF, CR, space
fn is_html_space(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(tokens: &[Token]) -> String {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Character(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_simple_element() {
        let tokens = Tokenizer::new("<div>hello</div>").tokenize_all();

        assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "div"));
        assert_eq!(text_of(&tokens), "hello");
        assert!(matches!(tokens.last(), Some(Token::EndTag { name }) if name == "div"));
    }

    #[test]
    fn test_attributes() {
        let tokens = Tokenizer::new(r#"<INPUT type="text" placeholder='Naam' data-x=1 disabled>"#)
            .tokenize_all();

        match &tokens[0] {
            Token::StartTag { name, attributes, self_closing } => {
                assert_eq!(name, "input");
                assert!(!self_closing);
                assert_eq!(attributes.len(), 4);
                assert_eq!(attributes[0], ("type".to_string(), "text".to_string()));
                assert_eq!(attributes[1], ("placeholder".to_string(), "Naam".to_string()));
                assert_eq!(attributes[2], ("data-x".to_string(), "1".to_string()));
                assert_eq!(attributes[3], ("disabled".to_string(), String::new()));
            }
            other => panic!("expected start tag, got {:?}", other),
        }
    }

    #[test]
    fn test_self_closing() {
        let tokens = Tokenizer::new("<br/>").tokenize_all();
        assert!(matches!(&tokens[0], Token::StartTag { self_closing: true, .. }));
    }

    #[test]
    fn test_duplicate_attribute_first_wins() {
        let tokens = Tokenizer::new(r#"<p class="a" class="b">"#).tokenize_all();
        match &tokens[0] {
            Token::StartTag { attributes, .. } => {
                assert_eq!(attributes.as_slice(), &[("class".to_string(), "a".to_string())]);
            }
            other => panic!("expected start tag, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_and_doctype() {
        let tokens = Tokenizer::new("<!DOCTYPE html><!-- note -->x").tokenize_all();
        assert_eq!(tokens[0], Token::Comment(" note ".to_string()));
        assert_eq!(tokens[1], Token::Character('x'));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_entities() {
        let tokens = Tokenizer::new("a &amp; b &lt;p&gt; &#65;&#x42; &bogus; & c").tokenize_all();
        assert_eq!(text_of(&tokens), "a & b <p> AB &bogus; & c");
    }

    #[test]
    fn test_stray_less_than() {
        let tokens = Tokenizer::new("1 < 2").tokenize_all();
        assert_eq!(text_of(&tokens), "1 < 2");
    }

    #[test]
    fn test_unterminated_tag_dropped() {
        let tokens = Tokenizer::new("text<div class=").tokenize_all();
        assert_eq!(text_of(&tokens), "text");
        assert_eq!(tokens.len(), 4);
    }
}
