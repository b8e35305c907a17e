//! Quiz levels

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, PlaygroundResult};

/// One quiz level: a markup fragment and the selector that solves it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Markup shown to the player and queried against
    #[serde(alias = "html")]
    pub markup: String,
    /// Selector whose first match is the target
    #[serde(alias = "answer")]
    pub reference_selector: String,
    #[serde(default)]
    pub hint: String,
}

impl Level {
    pub fn new(markup: impl Into<String>, reference_selector: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            reference_selector: reference_selector.into(),
            hint: hint.into(),
        }
    }

    /// The eight levels the selector game ships with
    pub fn builtin_levels() -> Vec<Level> {
        vec![
            Level::new(r#"<div class="box"></div>"#, ".box", r#"Select the element with class "box""#),
            Level::new(r#"<div id="hero"></div>"#, "#hero", r#"Select the element with id "hero""#),
            Level::new(
                "<ul><li>Item 1</li><li>Item 2</li><li>Item 3</li></ul>",
                "li",
                "Select all list items",
            ),
            Level::new(r#"<div class="card"><p>Tekst</p></div>"#, ".card p", "Select the <p> inside .card"),
            Level::new(
                r#"<button class="btn primary">Click</button>"#,
                ".btn.primary",
                "Select the element with both classes",
            ),
            Level::new(
                r#"<input type="text" placeholder="Naam">"#,
                r#"input[type="text"]"#,
                r#"Select the input with type="text""#,
            ),
            Level::new("<ul><li>A</li><li>B</li><li>C</li></ul>", "li:first-child", "Select only the first <li>"),
            Level::new("<p>Hover me!</p>", "p:hover", "Select the <p> on hover"),
        ]
    }
}

/// An ordered, non-empty list of levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSet {
    levels: Vec<Level>,
}

impl LevelSet {
    pub fn new(levels: Vec<Level>) -> PlaygroundResult<Self> {
        if levels.is_empty() {
            return Err(PlaygroundError::NoLevels);
        }
        Ok(Self { levels })
    }

    pub fn builtin() -> Self {
        Self { levels: Level::builtin_levels() }
    }

    /// Load levels from a JSON array of `{markup, reference_selector, hint}`
    pub fn from_json(json: &str) -> PlaygroundResult<Self> {
        let levels: Vec<Level> = serde_json::from_str(json)?;
        log::debug!("loaded {} levels from JSON", levels.len());
        Self::new(levels)
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

impl Index<usize> for LevelSet {
    type Output = Level;

    fn index(&self, index: usize) -> &Level {
        &self.levels[index]
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::builtin()
    }
}
