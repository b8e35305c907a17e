//! Fragment tree builder
//!
//! Constructs a fragment tree from markup tokens. Unlike document parsing
//! there are no implicit `html`/`head`/`body` elements: top-level nodes hang
//! directly off the fragment root.

use codecraft_dom::{is_void_element, DomTree, NodeId, NodeType};
use smallvec::SmallVec;

use crate::error::HtmlResult;
use crate::tokenizer::{Token, Tokenizer};

/// Deepest element nesting; past this, new elements are added but never opened
const MAX_DEPTH: usize = 512;

/// Parser that builds a fragment tree from markup
pub struct FragmentParser {
    tree: DomTree,
    open_elements: Vec<NodeId>,
}

/// Parse markup into a fragment tree
pub fn parse_fragment(markup: &str) -> HtmlResult<DomTree> {
    FragmentParser::new().parse(markup)
}

impl FragmentParser {
    /// Create a new fragment parser
    pub fn new() -> Self {
        Self {
            tree: DomTree::new(),
            open_elements: Vec::new(),
        }
    }

    /// Parse markup into a fragment tree
    pub fn parse(mut self, markup: &str) -> HtmlResult<DomTree> {
        let mut tokenizer = Tokenizer::new(markup);

        loop {
            let token = tokenizer.next_token();
            if token == Token::Eof {
                break;
            }
            self.process_token(token)?;
        }

        if !self.open_elements.is_empty() {
            log::trace!("{} element(s) left open at end of fragment", self.open_elements.len());
        }
        log::debug!("parsed fragment into {} nodes", self.tree.len());

        Ok(self.tree)
    }

    fn process_token(&mut self, token: Token) -> HtmlResult<()> {
        match token {
            Token::StartTag { name, attributes, self_closing } => {
                self.handle_start_tag(&name, attributes, self_closing)
            }
            Token::EndTag { name } => {
                self.handle_end_tag(&name);
                Ok(())
            }
            Token::Character(c) => self.handle_character(c),
            Token::Comment(text) => {
                let comment = self.tree.create_comment(text);
                let parent = self.current_node();
                self.tree.append_child(parent, comment)?;
                Ok(())
            }
            Token::Eof => Ok(()),
        }
    }

    fn handle_start_tag(
        &mut self,
        name: &str,
        attributes: SmallVec<[(String, String); 4]>,
        self_closing: bool,
    ) -> HtmlResult<()> {
        // A new <li> or <p> implicitly closes an open one of the same kind
        if matches!(name, "li" | "p" | "option") && self.current_tag() == Some(name) {
            self.open_elements.pop();
        }

        let element_id = self.tree.create_element(name);
        if let Some(elem) = self.tree.get_mut(element_id).and_then(|n| n.as_element_mut()) {
            for (key, value) in attributes {
                elem.set_attribute(key, value);
            }
        }

        let parent = self.current_node();
        self.tree.append_child(parent, element_id)?;

        if !self_closing && !is_void_element(name) {
            if self.open_elements.len() < MAX_DEPTH {
                self.open_elements.push(element_id);
            } else {
                log::debug!("<{}> nested past depth {}, left unopened", name, MAX_DEPTH);
            }
        }

        Ok(())
    }

    fn handle_end_tag(&mut self, name: &str) {
        let position = self.open_elements.iter().rposition(|&id| {
            self.tree.get(id).and_then(|n| n.tag_name()) == Some(name)
        });

        match position {
            Some(index) => self.open_elements.truncate(index),
            None => log::trace!("ignoring unmatched </{}>", name),
        }
    }

    fn handle_character(&mut self, c: char) -> HtmlResult<()> {
        let parent = self.current_node();

        // Coalesce into a trailing text node
        if let Some(&last_child_id) = self.tree.get(parent).and_then(|n| n.children.last()) {
            if let Some(last_child) = self.tree.get_mut(last_child_id) {
                if let NodeType::Text(ref mut text) = last_child.node_type {
                    text.push(c);
                    return Ok(());
                }
            }
        }

        let text_id = self.tree.create_text(c.to_string());
        self.tree.append_child(parent, text_id)?;
        Ok(())
    }

    /// Current insertion point (top of stack or the fragment root)
    fn current_node(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(self.tree.root_id())
    }

    fn current_tag(&self) -> Option<&str> {
        self.open_elements
            .last()
            .and_then(|&id| self.tree.get(id))
            .and_then(|n| n.tag_name())
    }
}

impl Default for FragmentParser {
    fn default() -> Self {
        Self::new()
    }
}
