//! CSS Selector Parser
//!
//! Parses selectors according to Selectors Level 4. Anything `querySelector`
//! would reject with a SyntaxError is an error here too, including unknown
//! pseudo-classes and trailing garbage.

use crate::error::{CssError, CssResult, SourceLocation};
use crate::nth::NthExpr;
use crate::tokenizer::{HashType, Token, Tokenizer};

/// Pseudo-classes that take no argument
const PLAIN_PSEUDO_CLASSES: &[&str] = &[
    "first-child", "last-child", "only-child", "first-of-type", "last-of-type",
    "only-of-type", "empty", "root", "link", "any-link", "enabled", "disabled",
    "checked", "required", "optional", "read-only", "read-write", "hover",
    "focus", "active", "visited", "focus-within", "focus-visible", "target",
];

/// Pseudo-classes written as functions
const NTH_PSEUDO_CLASSES: &[&str] = &["nth-child", "nth-last-child", "nth-of-type", "nth-last-of-type"];
const SELECTOR_PSEUDO_CLASSES: &[&str] = &["not", "is", "where"];

const PSEUDO_ELEMENTS: &[&str] = &[
    "before", "after", "first-line", "first-letter", "marker", "placeholder", "selection",
];

/// Pseudo-elements that also accept the legacy single-colon syntax
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// A complex selector: compound selectors joined by combinators
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Simple selectors and combinators in source order
    pub parts: Vec<SelectorPart>,
    /// Specificity of this selector (a, b, c)
    pub specificity: Specificity,
}

/// A comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

/// A part of a complex selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    /// Universal selector (*)
    Universal,
    /// Type selector (e.g., div, p, span)
    Type(String),
    /// Class selector (e.g., .container)
    Class(String),
    /// ID selector (e.g., #main)
    Id(String),
    /// Attribute selector (e.g., [type="text"])
    Attribute {
        name: String,
        op: Option<AttributeOp>,
        value: Option<String>,
        case_insensitive: bool,
    },
    /// Pseudo-class (e.g., :hover, :nth-child(2n))
    PseudoClass {
        name: String,
        arg: Option<PseudoArg>,
    },
    /// Pseudo-element (e.g., ::before)
    PseudoElement(String),
    /// Combinator between compound selectors
    Combinator(Combinator),
}

/// Parsed argument of a functional pseudo-class
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoArg {
    /// `:nth-child(2n+1)` and siblings
    Nth(NthExpr),
    /// `:not(...)`, `:is(...)`, `:where(...)`
    Selectors(SelectorList),
}

/// Attribute selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    /// [attr=value] - exact match
    Equals,
    /// [attr~=value] - contains word
    Includes,
    /// [attr|=value] - equals value or starts with value-
    DashMatch,
    /// [attr^=value] - starts with
    PrefixMatch,
    /// [attr$=value] - ends with
    SuffixMatch,
    /// [attr*=value] - contains
    SubstringMatch,
}

/// Selector combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (space)
    Descendant,
    /// Child combinator (>)
    Child,
    /// Next sibling combinator (+)
    NextSibling,
    /// Subsequent sibling combinator (~)
    SubsequentSibling,
}

/// Selector specificity (a, b, c)
/// a = ID selectors
/// b = class selectors, attribute selectors, pseudo-classes
/// c = type selectors, pseudo-elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct Specificity {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Specificity {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    /// Add another specificity
    pub fn add(&mut self, other: &Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
    }
}

impl Selector {
    /// Parse a single complex selector; a comma is an error
    pub fn parse(input: &str) -> CssResult<Self> {
        let mut parser = SelectorParser::new(input)?;
        let selector = parser.parse_selector()?;
        parser.expect_eof()?;
        Ok(selector)
    }

    /// Whether the selector ends in a pseudo-element, which no element matches
    pub fn has_pseudo_element(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, SelectorPart::PseudoElement(_)))
    }
}

impl SelectorList {
    /// Parse a comma-separated list of selectors
    pub fn parse(input: &str) -> CssResult<Self> {
        let mut parser = SelectorParser::new(input)?;
        let mut selectors = vec![parser.parse_selector()?];

        while parser.peek() == &Token::Comma {
            parser.advance()?;
            selectors.push(parser.parse_selector()?);
        }
        parser.expect_eof()?;

        Ok(Self { selectors })
    }

    /// Highest specificity among the selectors in the list
    pub fn max_specificity(&self) -> Specificity {
        self.selectors
            .iter()
            .map(|s| s.specificity)
            .max()
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Selector parser
struct SelectorParser<'a> {
    input: &'a str,
    tokenizer: Tokenizer<'a>,
    current: Token,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &'a str) -> CssResult<Self> {
        let mut tokenizer = Tokenizer::new(input);
        let current = tokenizer.next_token()?;
        Ok(Self { input, tokenizer, current })
    }

    fn location(&self) -> SourceLocation {
        self.tokenizer.location()
    }

    fn advance(&mut self) -> CssResult<Token> {
        let next = self.tokenizer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn peek(&self) -> &Token {
        &self.current
    }

    /// Skip whitespace, reporting whether any was present
    fn skip_whitespace(&mut self) -> CssResult<bool> {
        let mut skipped = false;
        while self.current == Token::Whitespace {
            self.advance()?;
            skipped = true;
        }
        Ok(skipped)
    }

    fn unexpected(&self) -> CssError {
        match &self.current {
            Token::Eof => CssError::UnexpectedEof { location: self.location() },
            token => CssError::unexpected(token, self.location()),
        }
    }

    fn expect_eof(&mut self) -> CssResult<()> {
        self.skip_whitespace()?;
        match self.peek() {
            Token::Eof => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_selector(&mut self) -> CssResult<Selector> {
        let mut parts = Vec::new();
        let mut specificity = Specificity::default();

        self.skip_whitespace()?;
        if matches!(self.peek(), Token::Eof | Token::Comma) {
            return Err(CssError::EmptySelector { location: self.location() });
        }

        loop {
            let ends_with_pseudo_element = self.parse_compound(&mut parts, &mut specificity)?;

            let had_whitespace = self.skip_whitespace()?;
            let combinator = match self.peek() {
                Token::Eof | Token::Comma => break,
                Token::Delim('>') => Combinator::Child,
                Token::Delim('+') => Combinator::NextSibling,
                Token::Delim('~') => Combinator::SubsequentSibling,
                _ if had_whitespace => Combinator::Descendant,
                _ => return Err(self.unexpected()),
            };

            // Nothing may follow a pseudo-element
            if ends_with_pseudo_element {
                return Err(self.unexpected());
            }

            if combinator != Combinator::Descendant {
                self.advance()?;
                self.skip_whitespace()?;
            }
            parts.push(SelectorPart::Combinator(combinator));
        }

        log::trace!("parsed selector {:?}", parts);
        Ok(Selector { parts, specificity })
    }

    /// Parse one compound selector. Returns whether it ended in a pseudo-element.
    fn parse_compound(
        &mut self,
        parts: &mut Vec<SelectorPart>,
        specificity: &mut Specificity,
    ) -> CssResult<bool> {
        let mut count = 0;

        // Type or universal selector may only lead the compound
        match self.peek().clone() {
            Token::Delim('*') => {
                self.advance()?;
                parts.push(SelectorPart::Universal);
                count += 1;
            }
            Token::Ident(name) => {
                self.advance()?;
                parts.push(SelectorPart::Type(name.to_ascii_lowercase()));
                specificity.add(&Specificity::new(0, 0, 1));
                count += 1;
            }
            _ => {}
        }

        loop {
            let (part, spec) = match self.peek().clone() {
                Token::Hash(name, HashType::Id) => {
                    self.advance()?;
                    (SelectorPart::Id(name), Specificity::new(1, 0, 0))
                }
                Token::Delim('.') => {
                    self.advance()?;
                    match self.advance()? {
                        Token::Ident(name) => (SelectorPart::Class(name), Specificity::new(0, 1, 0)),
                        token => return Err(CssError::unexpected(token, self.location())),
                    }
                }
                Token::LeftBracket => self.parse_attribute_selector()?,
                Token::Colon => self.parse_pseudo_selector()?,
                _ => break,
            };

            let is_pseudo_element = matches!(part, SelectorPart::PseudoElement(_));
            parts.push(part);
            specificity.add(&spec);
            count += 1;

            if is_pseudo_element {
                return Ok(true);
            }
        }

        if count == 0 {
            return Err(self.unexpected());
        }
        Ok(false)
    }

    fn parse_attribute_selector(&mut self) -> CssResult<(SelectorPart, Specificity)> {
        self.advance()?; // consume '['
        self.skip_whitespace()?;

        let name = match self.advance()? {
            Token::Ident(name) => name.to_ascii_lowercase(),
            token => return Err(CssError::unexpected(token, self.location())),
        };

        self.skip_whitespace()?;

        let op = match self.peek() {
            Token::Delim('=') => {
                self.advance()?;
                Some(AttributeOp::Equals)
            }
            Token::Delim(c @ ('~' | '|' | '^' | '$' | '*')) => {
                let op = match *c {
                    '~' => AttributeOp::Includes,
                    '|' => AttributeOp::DashMatch,
                    '^' => AttributeOp::PrefixMatch,
                    '$' => AttributeOp::SuffixMatch,
                    _ => AttributeOp::SubstringMatch,
                };
                self.advance()?;
                match self.advance()? {
                    Token::Delim('=') => Some(op),
                    token => return Err(CssError::unexpected(token, self.location())),
                }
            }
            _ => None,
        };

        let mut value = None;
        let mut case_insensitive = false;

        if op.is_some() {
            self.skip_whitespace()?;
            value = match self.advance()? {
                Token::Ident(v) | Token::String(v) => Some(v),
                token => return Err(CssError::unexpected(token, self.location())),
            };
            self.skip_whitespace()?;

            if let Token::Ident(flag) = self.peek() {
                if flag.eq_ignore_ascii_case("i") {
                    case_insensitive = true;
                } else if !flag.eq_ignore_ascii_case("s") {
                    return Err(self.unexpected());
                }
                self.advance()?;
                self.skip_whitespace()?;
            }
        }

        match self.advance()? {
            Token::RightBracket => {}
            Token::Eof => return Err(CssError::UnexpectedEof { location: self.location() }),
            token => return Err(CssError::unexpected(token, self.location())),
        }

        Ok((
            SelectorPart::Attribute { name, op, value, case_insensitive },
            Specificity::new(0, 1, 0),
        ))
    }

    fn parse_pseudo_selector(&mut self) -> CssResult<(SelectorPart, Specificity)> {
        self.advance()?; // consume first ':'
        let location = self.location();

        if self.peek() == &Token::Colon {
            self.advance()?;
            return match self.advance()? {
                Token::Ident(name) if PSEUDO_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) => {
                    Ok((SelectorPart::PseudoElement(name.to_ascii_lowercase()), Specificity::new(0, 0, 1)))
                }
                token => Err(CssError::unexpected(token, location)),
            };
        }

        match self.peek().clone() {
            Token::Ident(name) => {
                self.advance()?;
                let name = name.to_ascii_lowercase();
                if LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
                    Ok((SelectorPart::PseudoElement(name), Specificity::new(0, 0, 1)))
                } else if PLAIN_PSEUDO_CLASSES.contains(&name.as_str()) {
                    Ok((SelectorPart::PseudoClass { name, arg: None }, Specificity::new(0, 1, 0)))
                } else {
                    Err(CssError::UnknownPseudoClass { name, location })
                }
            }
            Token::Function(name) => {
                let name = name.to_ascii_lowercase();
                let argument = self.consume_function_arguments()?;
                self.parse_pseudo_argument(name, &argument, location)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Consume a function token through its matching ')' and return the raw
    /// text between the parentheses
    fn consume_function_arguments(&mut self) -> CssResult<String> {
        // The tokenizer sits just past the '(' of the current Function token
        let start = self.tokenizer.position();
        self.advance()?;
        let mut depth = 1;

        loop {
            match self.peek() {
                Token::Function(_) | Token::LeftParen => depth += 1,
                Token::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.tokenizer.position() - 1;
                        let argument = self.input[start..end].to_string();
                        self.advance()?;
                        return Ok(argument);
                    }
                }
                Token::Eof => return Err(CssError::UnexpectedEof { location: self.location() }),
                _ => {}
            }
            self.advance()?;
        }
    }

    fn parse_pseudo_argument(
        &self,
        name: String,
        argument: &str,
        location: SourceLocation,
    ) -> CssResult<(SelectorPart, Specificity)> {
        let invalid = |name: &str| CssError::InvalidArgument {
            name: name.to_string(),
            argument: argument.trim().to_string(),
            location,
        };

        if NTH_PSEUDO_CLASSES.contains(&name.as_str()) {
            let nth = NthExpr::parse(argument).ok_or_else(|| invalid(&name))?;
            return Ok((
                SelectorPart::PseudoClass { name, arg: Some(PseudoArg::Nth(nth)) },
                Specificity::new(0, 1, 0),
            ));
        }

        if SELECTOR_PSEUDO_CLASSES.contains(&name.as_str()) {
            let list = SelectorList::parse(argument).map_err(|_| invalid(&name))?;
            if list.iter().any(Selector::has_pseudo_element) {
                return Err(invalid(&name));
            }
            let specificity = match name.as_str() {
                "where" => Specificity::default(),
                _ => list.max_specificity(),
            };
            return Ok((
                SelectorPart::PseudoClass { name, arg: Some(PseudoArg::Selectors(list)) },
                specificity,
            ));
        }

        Err(CssError::UnknownPseudoClass { name, location })
    }
}
