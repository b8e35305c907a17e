//! `querySelector`-style lookups over a fragment tree

use codecraft_css::{CssResult, SelectorList};
use codecraft_dom::{DomTree, NodeId};

use crate::matching::{matches_any, MatchingContext};

/// First element in document order matched by any selector in the list
pub fn query_selector(tree: &DomTree, selectors: &SelectorList, context: &MatchingContext) -> Option<NodeId> {
    tree.descendants(tree.root_id())
        .into_iter()
        .find(|&id| matches_any(tree, id, selectors, context))
}

/// Every element matched by any selector in the list, in document order
pub fn query_selector_all(tree: &DomTree, selectors: &SelectorList, context: &MatchingContext) -> Vec<NodeId> {
    tree.descendants(tree.root_id())
        .into_iter()
        .filter(|&id| matches_any(tree, id, selectors, context))
        .collect()
}

/// Selector lookups that take selector text directly
pub trait SelectorQuery {
    /// First matching element, or `None`; malformed selectors are an error
    fn query_selector(&self, selectors: &str) -> CssResult<Option<NodeId>>;

    /// All matching elements in document order
    fn query_selector_all(&self, selectors: &str) -> CssResult<Vec<NodeId>>;
}

impl SelectorQuery for DomTree {
    fn query_selector(&self, selectors: &str) -> CssResult<Option<NodeId>> {
        let list = SelectorList::parse(selectors)?;
        Ok(query_selector(self, &list, &MatchingContext::new()))
    }

    fn query_selector_all(&self, selectors: &str) -> CssResult<Vec<NodeId>> {
        let list = SelectorList::parse(selectors)?;
        Ok(query_selector_all(self, &list, &MatchingContext::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codecraft_dom::Queryable;
    use codecraft_html::parse_fragment;

    #[test]
    fn test_first_in_document_order() {
        let tree = parse_fragment("<ul><li>A</li><li>B</li><li>C</li></ul>").unwrap();
        let items = tree.get_elements_by_tag_name("li");
        assert_eq!(tree.query_selector("li").unwrap(), Some(items[0]));
        assert_eq!(tree.query_selector_all("li").unwrap(), items);
    }

    #[test]
    fn test_list_results_stay_in_document_order() {
        let tree = parse_fragment("<h1>T</h1><p>a</p><h2>S</h2>").unwrap();
        let h1 = tree.get_elements_by_tag_name("h1")[0];
        let h2 = tree.get_elements_by_tag_name("h2")[0];
        assert_eq!(tree.query_selector_all("h2, h1").unwrap(), vec![h1, h2]);
        assert_eq!(tree.query_selector("h2, h1").unwrap(), Some(h1));
    }

    #[test]
    fn test_no_match() {
        let tree = parse_fragment(r#"<div class="box"></div>"#).unwrap();
        assert_eq!(tree.query_selector(".missing").unwrap(), None);
        assert!(tree.query_selector_all("span").unwrap().is_empty());
    }

    #[test]
    fn test_escaped_selectors() {
        let tree = parse_fragment(r#"<div id="x"></div><p class="1a"></p>"#).unwrap();
        assert_eq!(tree.query_selector(r"#\78").unwrap(), tree.get_element_by_id("x"));
        assert_eq!(tree.query_selector_all(r".\31 a").unwrap(), tree.get_elements_by_tag_name("p"));
    }

    #[test]
    fn test_text_and_comments_are_skipped() {
        let tree = parse_fragment("text<!-- c --><p>x</p>").unwrap();
        assert_eq!(tree.query_selector_all("*").unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let tree = parse_fragment("<p>x</p>").unwrap();
        assert!(tree.query_selector("[[invalid").is_err());
        assert!(tree.query_selector_all("").is_err());
        assert!(tree.query_selector("p:hovr").is_err());
    }

    #[test]
    fn test_hover_context() {
        let tree = parse_fragment("<p>Hover me!</p>").unwrap();
        let p = tree.get_elements_by_tag_name("p")[0];
        let list = SelectorList::parse("p:hover").unwrap();

        assert_eq!(query_selector(&tree, &list, &MatchingContext::new()), None);
        let ctx = MatchingContext::with_hover(&tree, p);
        assert_eq!(query_selector(&tree, &list, &ctx), Some(p));
    }
}
