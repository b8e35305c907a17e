//! Selector Matching
//!
//! Matches CSS selectors against fragment elements, right to left through
//! the combinators, backtracking over ancestor and sibling candidates.

use codecraft_css::{AttributeOp, Combinator, PseudoArg, Selector, SelectorList, SelectorPart};
use codecraft_dom::{DomTree, ElementData, NodeId, NodeType};
use rustc_hash::FxHashSet;

/// Elements whose enabled/disabled state is meaningful
const FORM_ELEMENTS: &[&str] = &["button", "input", "select", "textarea", "option", "optgroup", "fieldset"];

/// Context for dynamic pseudo-class matching (hover, focus, etc.)
#[derive(Debug, Clone, Default)]
pub struct MatchingContext {
    /// Elements currently being hovered
    pub hovered: FxHashSet<NodeId>,
    /// Element currently focused
    pub focused: Option<NodeId>,
    /// Element currently being activated (pressed)
    pub active: Option<NodeId>,
}

impl MatchingContext {
    /// Create a new empty matching context; nothing hovered or focused
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a hovered element and its ancestors
    pub fn with_hover(tree: &DomTree, element_id: NodeId) -> Self {
        let mut ctx = Self::new();
        // :hover applies to the ancestors of the hovered element too
        ctx.hovered.insert(element_id);
        ctx.hovered.extend(tree.ancestors(element_id));
        ctx
    }

    /// Check if an element is hovered
    pub fn is_hovered(&self, element_id: NodeId) -> bool {
        self.hovered.contains(&element_id)
    }

    /// Check if an element is focused
    pub fn is_focused(&self, element_id: NodeId) -> bool {
        self.focused == Some(element_id)
    }
}

/// Check if a selector matches a specific element in the tree
pub fn matches_selector(tree: &DomTree, element_id: NodeId, selector: &Selector) -> bool {
    matches_selector_with_context(tree, element_id, selector, &MatchingContext::new())
}

/// Check if a selector matches with dynamic pseudo-class context (hover, focus, etc.)
pub fn matches_selector_with_context(
    tree: &DomTree,
    element_id: NodeId,
    selector: &Selector,
    context: &MatchingContext,
) -> bool {
    // Pseudo-elements never select an element node
    if selector.parts.is_empty() || selector.has_pseudo_element() {
        return false;
    }

    let mut compounds: Vec<&[SelectorPart]> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut start = 0;
    for (i, part) in selector.parts.iter().enumerate() {
        if let SelectorPart::Combinator(c) = part {
            compounds.push(&selector.parts[start..i]);
            combinators.push(*c);
            start = i + 1;
        }
    }
    compounds.push(&selector.parts[start..]);

    let matcher = Matcher { tree, context };
    matcher.matches_from(element_id, &compounds, &combinators, compounds.len() - 1)
}

/// Check if any selector in a list matches
pub fn matches_any(
    tree: &DomTree,
    element_id: NodeId,
    list: &SelectorList,
    context: &MatchingContext,
) -> bool {
    list.iter()
        .any(|selector| matches_selector_with_context(tree, element_id, selector, context))
}

struct Matcher<'a> {
    tree: &'a DomTree,
    context: &'a MatchingContext,
}

impl Matcher<'_> {
    /// Match `compounds[..=index]` with `element_id` as the subject of `compounds[index]`
    fn matches_from(
        &self,
        element_id: NodeId,
        compounds: &[&[SelectorPart]],
        combinators: &[Combinator],
        index: usize,
    ) -> bool {
        if !self.matches_compound(element_id, compounds[index]) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = |candidate: NodeId| self.matches_from(candidate, compounds, combinators, index - 1);

        match combinators[index - 1] {
            Combinator::Child => self.parent_element(element_id).is_some_and(next),
            Combinator::Descendant => self.ancestor_elements(element_id).into_iter().any(next),
            Combinator::NextSibling => self.previous_siblings(element_id).first().copied().is_some_and(next),
            Combinator::SubsequentSibling => self.previous_siblings(element_id).into_iter().any(next),
        }
    }

    /// Match a compound selector (consecutive simple selectors) against an element
    fn matches_compound(&self, element_id: NodeId, parts: &[SelectorPart]) -> bool {
        let Some(element) = self.tree.get(element_id).and_then(|n| n.as_element()) else {
            return false;
        };
        parts
            .iter()
            .all(|part| self.matches_simple_selector(element_id, element, part))
    }

    fn matches_simple_selector(&self, element_id: NodeId, element: &ElementData, part: &SelectorPart) -> bool {
        match part {
            SelectorPart::Universal => true,
            SelectorPart::Type(tag) => element.tag_name.eq_ignore_ascii_case(tag),
            SelectorPart::Class(class) => element.has_class(class),
            SelectorPart::Id(id) => element.id() == Some(id.as_str()),
            SelectorPart::Attribute { name, op, value, case_insensitive } => {
                matches_attribute(element, name, *op, value.as_deref(), *case_insensitive)
            }
            SelectorPart::PseudoClass { name, arg } => {
                self.matches_pseudo_class(element_id, element, name, arg.as_ref())
            }
            SelectorPart::PseudoElement(_) | SelectorPart::Combinator(_) => false,
        }
    }

    fn matches_pseudo_class(
        &self,
        element_id: NodeId,
        element: &ElementData,
        name: &str,
        arg: Option<&PseudoArg>,
    ) -> bool {
        let tag = element.tag_name.as_str();
        match (name, arg) {
            ("first-child", _) => self.sibling_index(element_id, None, false) == Some(1),
            ("last-child", _) => self.sibling_index(element_id, None, true) == Some(1),
            ("only-child", _) => self.siblings(element_id).len() == 1,
            ("first-of-type", _) => self.sibling_index(element_id, Some(tag), false) == Some(1),
            ("last-of-type", _) => self.sibling_index(element_id, Some(tag), true) == Some(1),
            ("only-of-type", _) => {
                self.sibling_index(element_id, Some(tag), false) == Some(1)
                    && self.sibling_index(element_id, Some(tag), true) == Some(1)
            }
            ("nth-child", Some(PseudoArg::Nth(nth))) => self.sibling_index(element_id, None, false).is_some_and(|i| nth.matches(i)),
            ("nth-last-child", Some(PseudoArg::Nth(nth))) => self.sibling_index(element_id, None, true).is_some_and(|i| nth.matches(i)),
            ("nth-of-type", Some(PseudoArg::Nth(nth))) => self.sibling_index(element_id, Some(tag), false).is_some_and(|i| nth.matches(i)),
            ("nth-last-of-type", Some(PseudoArg::Nth(nth))) => self.sibling_index(element_id, Some(tag), true).is_some_and(|i| nth.matches(i)),
            ("not", Some(PseudoArg::Selectors(list))) => !matches_any(self.tree, element_id, list, self.context),
            ("is" | "where", Some(PseudoArg::Selectors(list))) => matches_any(self.tree, element_id, list, self.context),
            ("empty", _) => self.is_empty(element_id),
            // The fragment container is never the document root
            ("root", _) => false,
            ("link" | "any-link", _) => matches!(tag, "a" | "area") && element.get_attribute("href").is_some(),
            ("enabled", _) => FORM_ELEMENTS.contains(&tag) && !is_disabled(element),
            ("disabled", _) => FORM_ELEMENTS.contains(&tag) && is_disabled(element),
            ("checked", _) => match tag {
                "input" => element.get_attribute("checked").is_some(),
                "option" => element.get_attribute("selected").is_some(),
                _ => false,
            },
            ("required", _) => is_requirable(tag) && element.get_attribute("required").is_some(),
            ("optional", _) => is_requirable(tag) && element.get_attribute("required").is_none(),
            ("read-write", _) => is_read_write(element),
            ("read-only", _) => !is_read_write(element),
            ("hover", _) => self.context.is_hovered(element_id),
            ("focus" | "focus-visible", _) => self.context.is_focused(element_id),
            ("focus-within", _) => self
                .context
                .focused
                .is_some_and(|f| f == element_id || self.tree.ancestors(f).contains(&element_id)),
            ("active", _) => self.context.active == Some(element_id),
            ("visited" | "target", _) => false,
            (other, _) => {
                log::debug!("pseudo-class :{} has no matcher", other);
                false
            }
        }
    }

    /// Parent of an element, if it is itself an element (not the fragment root)
    fn parent_element(&self, element_id: NodeId) -> Option<NodeId> {
        self.tree
            .parent(element_id)
            .filter(|&p| self.tree.get(p).is_some_and(|n| n.is_element()))
    }

    fn ancestor_elements(&self, element_id: NodeId) -> Vec<NodeId> {
        self.tree
            .ancestors(element_id)
            .into_iter()
            .filter(|&a| self.tree.get(a).is_some_and(|n| n.is_element()))
            .collect()
    }

    /// Element siblings including the element itself, in document order
    fn siblings(&self, element_id: NodeId) -> Vec<NodeId> {
        match self.tree.parent(element_id) {
            Some(parent) => self.tree.element_children(parent),
            None => vec![element_id],
        }
    }

    /// Element siblings before this one, nearest first
    fn previous_siblings(&self, element_id: NodeId) -> Vec<NodeId> {
        let siblings = self.siblings(element_id);
        let position = siblings.iter().position(|&s| s == element_id).unwrap_or(0);
        siblings[..position].iter().rev().copied().collect()
    }

    /// 1-based index among element siblings, optionally only those with `tag`,
    /// counted from the end when `from_end` is set
    fn sibling_index(&self, element_id: NodeId, tag: Option<&str>, from_end: bool) -> Option<i32> {
        let mut siblings: Vec<NodeId> = self
            .siblings(element_id)
            .into_iter()
            .filter(|&s| match tag {
                Some(tag) => self.tree.get(s).and_then(|n| n.tag_name()) == Some(tag),
                None => true,
            })
            .collect();
        if from_end {
            siblings.reverse();
        }
        siblings
            .iter()
            .position(|&s| s == element_id)
            .map(|i| i as i32 + 1)
    }

    /// No element children and no text at all (comments are fine)
    fn is_empty(&self, element_id: NodeId) -> bool {
        self.tree.children(element_id).into_iter().all(|child| {
            match self.tree.get(child).map(|n| &n.node_type) {
                Some(NodeType::Element(_)) => false,
                Some(NodeType::Text(text)) => text.is_empty(),
                _ => true,
            }
        })
    }
}

/// Match an attribute selector
fn matches_attribute(
    element: &ElementData,
    name: &str,
    op: Option<AttributeOp>,
    expected: Option<&str>,
    case_insensitive: bool,
) -> bool {
    let Some(actual) = element.get_attribute(name) else {
        return false;
    };
    let (Some(op), Some(expected)) = (op, expected) else {
        // [attr] only checks presence
        return op.is_none();
    };

    let (actual, expected) = if case_insensitive {
        (actual.to_ascii_lowercase(), expected.to_ascii_lowercase())
    } else {
        (actual.to_string(), expected.to_string())
    };

    match op {
        AttributeOp::Equals => actual == expected,
        AttributeOp::Includes => !expected.is_empty() && actual.split_whitespace().any(|w| w == expected),
        AttributeOp::DashMatch => actual == expected || actual.starts_with(&format!("{}-", expected)),
        AttributeOp::PrefixMatch => !expected.is_empty() && actual.starts_with(&expected),
        AttributeOp::SuffixMatch => !expected.is_empty() && actual.ends_with(&expected),
        AttributeOp::SubstringMatch => !expected.is_empty() && actual.contains(&expected),
    }
}

fn is_disabled(element: &ElementData) -> bool {
    element.get_attribute("disabled").is_some()
}

fn is_requirable(tag: &str) -> bool {
    matches!(tag, "input" | "select" | "textarea")
}

fn is_read_write(element: &ElementData) -> bool {
    let editable_control = match element.tag_name.as_str() {
        "textarea" => true,
        "input" => !matches!(
            element.get_attribute("type").map(|t| t.to_ascii_lowercase()).as_deref(),
            Some("checkbox" | "radio" | "button" | "submit" | "reset" | "hidden" | "range" | "color" | "file" | "image")
        ),
        _ => false,
    };
    if editable_control {
        return element.get_attribute("readonly").is_none() && !is_disabled(element);
    }
    element
        .get_attribute("contenteditable")
        .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codecraft_dom::Queryable;
    use codecraft_html::parse_fragment;

    fn matches(markup: &str, selector: &str, tag: &str, index: usize) -> bool {
        let tree = parse_fragment(markup).unwrap();
        let element = tree.get_elements_by_tag_name(tag)[index];
        let selector = Selector::parse(selector).unwrap();
        matches_selector(&tree, element, &selector)
    }

    #[test]
    fn test_simple_selectors() {
        let markup = r#"<div id="hero" class="box big"></div>"#;
        assert!(matches(markup, "div", "div", 0));
        assert!(matches(markup, "*", "div", 0));
        assert!(matches(markup, ".box", "div", 0));
        assert!(matches(markup, ".big.box", "div", 0));
        assert!(matches(markup, "#hero", "div", 0));
        assert!(matches(markup, "div#hero.box", "div", 0));
        assert!(!matches(markup, "span", "div", 0));
        assert!(!matches(markup, ".missing", "div", 0));
        assert!(!matches(markup, "#HERO", "div", 0));
    }

    #[test]
    fn test_combinators() {
        let markup = r#"<div class="card"><section><p>Tekst</p></section></div><p>out</p>"#;
        assert!(matches(markup, ".card p", "p", 0));
        assert!(matches(markup, "div section > p", "p", 0));
        assert!(!matches(markup, ".card > p", "p", 0));
        assert!(!matches(markup, ".card p", "p", 1));
        assert!(matches(markup, "div + p", "p", 1));
        assert!(matches(markup, ".card ~ p", "p", 1));
        assert!(!matches(markup, "section + p", "p", 1));
    }

    #[test]
    fn test_descendant_backtracks() {
        // The nearest .a ancestor is not inside .b, a farther one is
        let markup = r#"<div class="b"><div class="a"><div class="a"><span></span></div></div></div>"#;
        assert!(matches(markup, ".b > .a span", "span", 0));
        assert!(matches(markup, ".b .a > .a > span", "span", 0));
        assert!(!matches(markup, ".b > .a > span", "span", 0));
    }

    #[test]
    fn test_sibling_combinators_skip_text() {
        let markup = "<h1>T</h1> text <p>a</p><!-- c --><p>b</p>";
        assert!(matches(markup, "h1 + p", "p", 0));
        assert!(!matches(markup, "h1 + p", "p", 1));
        assert!(matches(markup, "h1 ~ p", "p", 1));
        assert!(matches(markup, "p + p", "p", 1));
    }

    #[test]
    fn test_attributes() {
        let markup = r#"<input type="text" placeholder="Naam" lang="en-US" class="a b">"#;
        assert!(matches(markup, "[type]", "input", 0));
        assert!(matches(markup, r#"input[type="text"]"#, "input", 0));
        assert!(matches(markup, "[type=text]", "input", 0));
        assert!(!matches(markup, "[type=TEXT]", "input", 0));
        assert!(matches(markup, "[type=TEXT i]", "input", 0));
        assert!(matches(markup, "[class~=b]", "input", 0));
        assert!(matches(markup, "[lang|=en]", "input", 0));
        assert!(matches(markup, "[placeholder^=Na]", "input", 0));
        assert!(matches(markup, "[placeholder$=am]", "input", 0));
        assert!(matches(markup, "[placeholder*=aa]", "input", 0));
        assert!(!matches(markup, "[placeholder^=\"\"]", "input", 0));
        assert!(!matches(markup, "[name]", "input", 0));
    }

    #[test]
    fn test_structural_pseudo_classes() {
        let markup = "<ul><li>A</li><li>B</li><li>C</li></ul>";
        assert!(matches(markup, "li:first-child", "li", 0));
        assert!(!matches(markup, "li:first-child", "li", 1));
        assert!(matches(markup, "li:last-child", "li", 2));
        assert!(matches(markup, "li:nth-child(2)", "li", 1));
        assert!(matches(markup, "li:nth-child(odd)", "li", 2));
        assert!(matches(markup, "li:nth-last-child(3)", "li", 0));
        assert!(matches(markup, "li:nth-of-type(2n)", "li", 1));
        assert!(matches(markup, "ul:only-child", "ul", 0));
        assert!(!matches(markup, "li:only-child", "li", 0));
        assert!(matches(markup, "li:first-of-type", "li", 0));
        assert!(matches(markup, "li:last-of-type", "li", 2));
    }

    #[test]
    fn test_empty() {
        let markup = r#"<div class="box"></div><div><!-- c --></div><div> </div>"#;
        assert!(matches(markup, ":empty", "div", 0));
        assert!(matches(markup, ":empty", "div", 1));
        assert!(!matches(markup, ":empty", "div", 2));
    }

    #[test]
    fn test_logical_pseudo_classes() {
        let markup = r#"<p class="a">1</p><p class="b">2</p>"#;
        assert!(matches(markup, "p:not(.b)", "p", 0));
        assert!(!matches(markup, "p:not(.a, .c)", "p", 0));
        assert!(matches(markup, ":is(.x, .b)", "p", 1));
        assert!(matches(markup, "p:where(.a)", "p", 0));
    }

    #[test]
    fn test_form_pseudo_classes() {
        let markup = r#"<input required><input disabled><input type="checkbox" checked><textarea readonly></textarea><div></div>"#;
        assert!(matches(markup, ":required", "input", 0));
        assert!(matches(markup, ":optional", "input", 1));
        assert!(matches(markup, ":disabled", "input", 1));
        assert!(matches(markup, ":enabled", "input", 0));
        assert!(matches(markup, ":checked", "input", 2));
        assert!(matches(markup, ":read-write", "input", 0));
        assert!(matches(markup, ":read-only", "textarea", 0));
        assert!(!matches(markup, ":enabled", "div", 0));
        assert!(matches(markup, ":read-only", "div", 0));
    }

    #[test]
    fn test_dynamic_pseudo_classes_need_context() {
        let tree = parse_fragment("<div><p>Hover me!</p></div>").unwrap();
        let div = tree.get_elements_by_tag_name("div")[0];
        let p = tree.get_elements_by_tag_name("p")[0];
        let hover = Selector::parse("p:hover").unwrap();
        let div_hover = Selector::parse("div:hover > p").unwrap();

        assert!(!matches_selector(&tree, p, &hover));

        let ctx = MatchingContext::with_hover(&tree, p);
        assert!(matches_selector_with_context(&tree, p, &hover, &ctx));
        assert!(matches_selector_with_context(&tree, p, &div_hover, &ctx));
        assert!(ctx.is_hovered(div));

        let focused = MatchingContext { focused: Some(p), ..MatchingContext::new() };
        let within = Selector::parse("div:focus-within").unwrap();
        assert!(matches_selector_with_context(&tree, div, &within, &focused));
    }

    #[test]
    fn test_pseudo_elements_never_match() {
        assert!(!matches("<p>x</p>", "p::before", "p", 0));
    }

    #[test]
    fn test_root_container_is_not_an_element() {
        assert!(!matches("<p>x</p>", "* > p", "p", 0));
        assert!(!matches("<p>x</p>", ":root", "p", 0));
    }
}
