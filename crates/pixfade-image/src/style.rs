//! Inline style declarations
//!
//! An ordered property list serialized the way browsers serialize
//! `element.style.cssText`: `prop: value;` pairs separated by spaces.

use std::fmt;

/// Ordered inline style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    decls: Vec<(String, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property. Existing properties keep their position.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.decls.iter_mut().find(|(p, _)| p == property) {
            Some((_, v)) => *v = value,
            None => self.decls.push((property.to_string(), value)),
        }
    }

    /// Builder form of [`Style::set`]
    pub fn with(mut self, property: &str, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let pos = self.decls.iter().position(|(p, _)| p == property)?;
        Some(self.decls.remove(pos).1)
    }

    /// Apply `other` on top of `self`, later values winning
    pub fn merge(&mut self, other: &Style) {
        for (p, v) in &other.decls {
            self.set(p, v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Parse a `style` attribute value
    ///
    /// Semicolons inside parentheses or quotes do not end a declaration,
    /// so `url(data:image/png;base64,...)` survives. Declarations without
    /// a colon are dropped.
    pub fn parse(css: &str) -> Style {
        let mut style = Style::new();
        for decl in split_declarations(css) {
            if let Some((prop, value)) = decl.split_once(':') {
                let prop = prop.trim().to_ascii_lowercase();
                let value = value.trim();
                if !prop.is_empty() && !value.is_empty() {
                    style.set(&prop, value);
                }
            }
        }
        style
    }

    /// Serialize as `a: b; c: d;`
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (p, v)) in self.decls.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{p}: {v};")?;
        }
        Ok(())
    }
}

fn split_declarations(css: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0u32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in css.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                out.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&css[start..]);
    out
}
