//! `An+B` microsyntax used by the `:nth-*` pseudo-classes

use std::fmt;

/// A parsed `An+B` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpr {
    pub a: i32,
    pub b: i32,
}

impl NthExpr {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse `odd`, `even`, `3`, `2n+1`, `-n+3`, `n` and friends
    pub fn parse(input: &str) -> Option<Self> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "" => return None,
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }

        let Some(n_pos) = compact.find('n') else {
            return parse_signed(&compact).map(|b| Self::new(0, b));
        };

        let a = match &compact[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            digits => parse_signed(digits)?,
        };

        let rest = &compact[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else if rest.starts_with('+') || rest.starts_with('-') {
            parse_signed(rest)?
        } else {
            return None;
        };

        Some(Self::new(a, b))
    }

    /// Whether a 1-based sibling index satisfies `index = a*k + b` for some k >= 0
    pub fn matches(&self, index: i32) -> bool {
        if self.a == 0 {
            return index == self.b;
        }
        let offset = index - self.b;
        offset % self.a == 0 && offset / self.a >= 0
    }
}

impl fmt::Display for NthExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{}", b),
            (a, 0) => write!(f, "{}n", a),
            (a, b) => write!(f, "{}n{:+}", a, b),
        }
    }
}

fn parse_signed(s: &str) -> Option<i32> {
    let unsigned = s.strip_prefix('+').or_else(|| s.strip_prefix('-')).unwrap_or(s);
    if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.strip_prefix('+').unwrap_or(s).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(NthExpr::parse("odd"), Some(NthExpr::new(2, 1)));
        assert_eq!(NthExpr::parse(" EVEN "), Some(NthExpr::new(2, 0)));
    }

    #[test]
    fn test_forms() {
        assert_eq!(NthExpr::parse("3"), Some(NthExpr::new(0, 3)));
        assert_eq!(NthExpr::parse("2n+1"), Some(NthExpr::new(2, 1)));
        assert_eq!(NthExpr::parse("2n - 1"), Some(NthExpr::new(2, -1)));
        assert_eq!(NthExpr::parse("-n+3"), Some(NthExpr::new(-1, 3)));
        assert_eq!(NthExpr::parse("n"), Some(NthExpr::new(1, 0)));
        assert_eq!(NthExpr::parse("+5"), Some(NthExpr::new(0, 5)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(NthExpr::parse(""), None);
        assert_eq!(NthExpr::parse("first"), None);
        assert_eq!(NthExpr::parse("2n3"), None);
        assert_eq!(NthExpr::parse("x"), None);
        assert_eq!(NthExpr::parse("+-2"), None);
    }

    #[test]
    fn test_matches() {
        let odd = NthExpr::new(2, 1);
        assert!(odd.matches(1));
        assert!(!odd.matches(2));
        assert!(odd.matches(3));

        let first_three = NthExpr::new(-1, 3);
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));

        assert!(NthExpr::new(0, 2).matches(2));
        assert!(!NthExpr::new(0, 2).matches(4));
    }

    #[test]
    fn test_display() {
        assert_eq!(NthExpr::new(2, 1).to_string(), "2n+1");
        assert_eq!(NthExpr::new(-1, 0).to_string(), "-1n");
        assert_eq!(NthExpr::new(0, 4).to_string(), "4");
    }
}
