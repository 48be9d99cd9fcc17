//! Rendering context - tracks state while a plan is replayed

use std::collections::HashMap;

use miette::NamedSource;

use crate::errors::SourceContext;

/// Rendering context
pub struct RenderContext<'s> {
    /// Plan source, for diagnostics
    pub source: &'s SourceContext,
    /// User variables, names include the `$`
    pub variables: HashMap<String, f64>,
    /// Value of `halfwall`; known once the drawing area is configured
    pub half_wall: Option<f64>,
    /// Enclosing room names, outermost first
    pub rooms: Vec<String>,
}

impl<'s> RenderContext<'s> {
    pub fn new(source: &'s SourceContext) -> Self {
        Self {
            source,
            variables: HashMap::new(),
            half_wall: None,
            rooms: Vec::new(),
        }
    }

    pub fn src(&self) -> NamedSource<String> {
        self.source.named_source()
    }

    /// `Bad` or `Wohnung / Bad` for nested rooms, empty at top level
    pub fn room_path(&self) -> String {
        self.rooms.join(" / ")
    }

    /// Closest defined variable name, if one is plausibly a typo of `name`
    pub fn suggest(&self, name: &str) -> Option<String> {
        self.variables
            .keys()
            .map(|candidate| (edit_distance(name, candidate), candidate))
            .filter(|(distance, _)| *distance <= 2)
            .min()
            .map(|(_, candidate)| format!("did you mean `{candidate}`?"))
    }
}

/// Levenshtein distance over chars
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("$w1", "$w1"), 0);
        assert_eq!(edit_distance("$w1", "$w2"), 1);
        assert_eq!(edit_distance("$hw", "$w"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn suggests_near_names_only() {
        let source = SourceContext::new("test.plan", "");
        let mut ctx = RenderContext::new(&source);
        ctx.variables.insert("$width".into(), 3.0);
        ctx.variables.insert("$height".into(), 2.0);
        assert_eq!(ctx.suggest("$widht").as_deref(), Some("did you mean `$width`?"));
        assert_eq!(ctx.suggest("$depth"), None);
    }
}
