//! Selector quiz session
//!
//! Walks the player through a `LevelSet`. Each level's markup is parsed once
//! up front; the live fragment is a fresh copy per visit so highlights from a
//! previous attempt never leak into the next one.

use codecraft_css::SelectorList;
use codecraft_dom::{DomTree, NodeId};
use codecraft_html::parse_fragment;
use codecraft_style::{query_selector_all, MatchingContext};

use crate::checker::check_with_context;
use crate::error::{PlaygroundError, PlaygroundResult};
use crate::level::{Level, LevelSet};

/// Class added to elements matched by a correct answer
pub const HIGHLIGHT_CLASS: &str = "highlighted";

/// Quiz configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    /// Points awarded the first time a level is solved
    pub points_per_level: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self { points_per_level: 10 }
    }
}

/// Result of submitting an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Correct {
        /// Zero when the level was already solved
        points_awarded: u32,
        /// Elements the answer selects, in document order
        matched: Vec<NodeId>,
    },
    Incorrect {
        /// The reference selector, shown as a hint
        expected: String,
    },
}

impl Outcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct { .. })
    }
}

/// Result of moving to the next level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Now on this level (1-based)
    Level(usize),
    /// Ran past the last level; the session has been reset
    Finished { score: u32, max_score: u32 },
}

/// Quiz state: current level, running score and the live fragment
pub struct QuizSession {
    levels: LevelSet,
    config: QuizConfig,
    fragments: Vec<DomTree>,
    current: usize,
    score: u32,
    solved: bool,
    fragment: DomTree,
    context: MatchingContext,
}

impl QuizSession {
    /// Start a session; fails if any level's markup cannot be parsed
    pub fn new(levels: LevelSet, config: QuizConfig) -> PlaygroundResult<Self> {
        let fragments = levels
            .iter()
            .enumerate()
            .map(|(i, level)| {
                parse_fragment(&level.markup).map_err(|source| PlaygroundError::Markup { level: i + 1, source })
            })
            .collect::<PlaygroundResult<Vec<_>>>()?;

        let fragment = fragments.first().cloned().ok_or(PlaygroundError::NoLevels)?;
        log::info!("quiz started with {} levels", levels.len());

        Ok(Self {
            levels,
            config,
            fragments,
            current: 0,
            score: 0,
            solved: false,
            fragment,
            context: MatchingContext::new(),
        })
    }

    pub fn current_level(&self) -> &Level {
        &self.levels[self.current]
    }

    /// 1-based number of the current level
    pub fn level_number(&self) -> usize {
        self.current + 1
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        let levels = u32::try_from(self.levels.len()).unwrap_or(u32::MAX);
        self.config.points_per_level.saturating_mul(levels)
    }

    /// The live fragment for the current level, including highlights
    pub fn fragment(&self) -> &DomTree {
        &self.fragment
    }

    /// Whether the current level has been answered correctly
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Mark an element (and its ancestors) as hovered, or clear hover state
    pub fn hover(&mut self, element: Option<NodeId>) {
        self.context.hovered = match element {
            Some(id) => MatchingContext::with_hover(&self.fragment, id).hovered,
            None => Default::default(),
        };
    }

    /// Check an answer against the current level
    ///
    /// The input is trimmed first; blank input is ignored and returns `None`.
    pub fn submit(&mut self, answer: &str) -> Option<Outcome> {
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }

        let level = &self.levels[self.current];
        let verdict = check_with_context(answer, &level.reference_selector, &self.fragment, &self.context);

        if !verdict.is_match() {
            log::debug!("level {}: '{}' rejected", self.level_number(), answer);
            return Some(Outcome::Incorrect { expected: level.reference_selector.clone() });
        }

        let points_awarded = if self.solved { 0 } else { self.config.points_per_level };
        self.score = self.score.saturating_add(points_awarded);
        self.solved = true;

        let matched = self.highlight(answer);
        log::debug!("level {}: '{}' accepted, {} element(s) matched", self.level_number(), answer, matched.len());

        Some(Outcome::Correct { points_awarded, matched })
    }

    /// Move to the next level, or finish and start over after the last one
    pub fn advance(&mut self) -> Advance {
        if self.current + 1 < self.levels.len() {
            self.load(self.current + 1);
            return Advance::Level(self.level_number());
        }

        let finished = Advance::Finished { score: self.score, max_score: self.max_score() };
        log::info!("quiz finished: {}/{}", self.score, self.max_score());
        self.score = 0;
        self.load(0);
        finished
    }

    fn load(&mut self, index: usize) {
        self.current = index;
        self.solved = false;
        self.context = MatchingContext::new();
        if let Some(fragment) = self.fragments.get(index) {
            self.fragment = fragment.clone();
        }
    }

    /// Add the highlight class to every element the answer selects
    fn highlight(&mut self, answer: &str) -> Vec<NodeId> {
        let Ok(list) = SelectorList::parse(answer) else {
            return Vec::new();
        };
        let matched = query_selector_all(&self.fragment, &list, &self.context);
        for &id in &matched {
            if let Some(element) = self.fragment.get_mut(id).and_then(|n| n.as_element_mut()) {
                element.add_class(HIGHLIGHT_CLASS);
            }
        }
        matched
    }
}
