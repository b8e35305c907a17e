//! Selector equivalence checking
//!
//! A candidate selector is accepted when it is textually identical to the
//! reference, or when both pick the same first element in the fragment.
//! Only the first match is compared: `li:first-child` is accepted for a
//! reference of `li` because both return the first `<li>`.

use codecraft_css::{CssResult, SelectorList};
use codecraft_dom::{DomTree, NodeId};
use codecraft_style::{query_selector, MatchingContext};

/// Outcome of comparing a candidate selector against a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    NoMatch,
}

impl Verdict {
    pub fn is_match(self) -> bool {
        self == Verdict::Match
    }
}

impl From<bool> for Verdict {
    fn from(matched: bool) -> Self {
        if matched {
            Verdict::Match
        } else {
            Verdict::NoMatch
        }
    }
}

/// Decide whether `candidate` selects the same element as `reference`
///
/// Malformed candidates are a `NoMatch`, never an error.
pub fn check(candidate: &str, reference: &str, fragment: &DomTree) -> Verdict {
    check_with_context(candidate, reference, fragment, &MatchingContext::new())
}

/// Like [`check`], with hover/focus state for dynamic pseudo-classes
pub fn check_with_context(
    candidate: &str,
    reference: &str,
    fragment: &DomTree,
    context: &MatchingContext,
) -> Verdict {
    if candidate == reference {
        return Verdict::Match;
    }

    let candidate_match = match first_match(candidate, fragment, context) {
        Ok(Some(id)) => id,
        Ok(None) => {
            log::debug!("candidate '{}' matches nothing", candidate);
            return Verdict::NoMatch;
        }
        Err(e) => {
            log::debug!("candidate '{}' rejected: {}", candidate, e);
            return Verdict::NoMatch;
        }
    };

    match first_match(reference, fragment, context) {
        Ok(reference_match) => Verdict::from(reference_match == Some(candidate_match)),
        Err(e) => {
            log::warn!("reference selector '{}' does not parse: {}", reference, e);
            Verdict::NoMatch
        }
    }
}

fn first_match(selectors: &str, fragment: &DomTree, context: &MatchingContext) -> CssResult<Option<NodeId>> {
    let list = SelectorList::parse(selectors)?;
    Ok(query_selector(fragment, &list, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codecraft_dom::Queryable;
    use codecraft_html::parse_fragment;

    fn fragment(markup: &str) -> DomTree {
        parse_fragment(markup).unwrap()
    }

    #[test]
    fn test_identical_text_always_matches() {
        assert_eq!(check(".box", ".box", &DomTree::new()), Verdict::Match);
        assert_eq!(check("[[invalid", "[[invalid", &fragment("<p></p>")), Verdict::Match);
    }

    #[test]
    fn test_box_fragment() {
        let tree = fragment(r#"<div class="box"></div>"#);
        assert_eq!(check("div", ".box", &tree), Verdict::Match);
        assert_eq!(check("div.box", ".box", &tree), Verdict::Match);
        assert_eq!(check(".missing", ".box", &tree), Verdict::NoMatch);
        assert_eq!(check("[[invalid", ".box", &tree), Verdict::NoMatch);
        assert_eq!(check("", ".box", &tree), Verdict::NoMatch);
    }

    #[test]
    fn test_first_match_only() {
        let tree = fragment("<ul><li>Item 1</li><li>Item 2</li></ul>");
        assert!(check("li:first-child", "li", &tree).is_match());
        assert!(check("ul > li", "li", &tree).is_match());
        assert!(!check("li:last-child", "li", &tree).is_match());
        assert!(!check("ul", "li", &tree).is_match());
    }

    #[test]
    fn test_both_empty_is_no_match() {
        let tree = fragment("<p>x</p>");
        assert_eq!(check("span", "div", &tree), Verdict::NoMatch);
    }

    #[test]
    fn test_broken_reference_is_no_match() {
        let tree = fragment("<p>x</p>");
        assert_eq!(check("p", "p[", &tree), Verdict::NoMatch);
    }

    #[test]
    fn test_hover_needs_context() {
        let tree = fragment("<p>Hover me!</p>");
        assert_eq!(check("p", "p:hover", &tree), Verdict::NoMatch);

        let p = tree.get_elements_by_tag_name("p")[0];
        let hovered = MatchingContext::with_hover(&tree, p);
        assert_eq!(check_with_context("p", "p:hover", &tree, &hovered), Verdict::Match);
        assert_eq!(check_with_context(":hover", "p:hover", &tree, &hovered), Verdict::Match);
    }
}
