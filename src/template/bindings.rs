//! Named placeholder bindings and single-pass substitution.

/// Ordered set of `{name}` placeholder bindings for one call site.
///
/// Substitution scans the template once from left to right. A bound value is
/// copied to the output verbatim and never re-scanned, so the result does not
/// depend on binding order and values that happen to contain `{token}` text
/// are left alone. Placeholders without a binding pass through literally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateBindings {
    entries: Vec<(String, String)>,
}

impl TemplateBindings {
    /// What: Create an empty binding set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// What: Builder-style [`Self::insert`].
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// What: Bind `name` to `value`, replacing an existing binding in place.
    ///
    /// Details:
    /// - `name` is given without braces (`"amount_left"`).
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    /// What: Value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `name` has a binding.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether no placeholder is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// What: Iterate bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// What: Substitute every bound `{name}` token in `text`.
    ///
    /// Inputs:
    /// - `text`: Resolved template text
    ///
    /// Output:
    /// - Text with bound tokens replaced; all other characters unchanged
    ///
    /// Details:
    /// - Every occurrence of a bound token is replaced.
    /// - An unterminated `{` or an unbound `{name}` is copied as-is.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        if self.entries.is_empty() || !text.contains('{') {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let bound = after
                .find('}')
                .and_then(|close| self.get(&after[..close]).map(|value| (close, value)));
            match bound {
                Some((close, value)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl<'a> FromIterator<(&'a str, String)> for TemplateBindings {
    fn from_iter<T: IntoIterator<Item = (&'a str, String)>>(iter: T) -> Self {
        let mut bindings = Self::new();
        for (name, value) in iter {
            bindings.insert(name, value);
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Every occurrence of a bound token is replaced, unbound ones stay.
    fn apply_replaces_all_bound_tokens() {
        let b = TemplateBindings::new()
            .with("formattedPrice", "$4.00")
            .with("guaranteePriceFmt", "$250.00");
        assert_eq!(
            b.apply("{formattedPrice} covers up to {guaranteePriceFmt} ({formattedPrice})"),
            "$4.00 covers up to $250.00 ($4.00)"
        );
        assert_eq!(b.apply("{unknown} {formattedPrice"), "{unknown} {formattedPrice");
    }

    #[test]
    /// What: Values are not re-scanned for further tokens.
    ///
    /// Inputs:
    /// - `a` bound to a value containing `{b}`.
    ///
    /// Output:
    /// - The `{b}` text in the value survives.
    fn substituted_values_are_not_rescanned() {
        let b = TemplateBindings::new().with("a", "{b}").with("b", "B");
        assert_eq!(b.apply("{a}{b}"), "{b}B");
        let reversed = TemplateBindings::new().with("b", "B").with("a", "{b}");
        assert_eq!(reversed.apply("{a}{b}"), "{b}B");
    }

    #[test]
    /// What: Nested braces and unicode around tokens survive unchanged.
    fn braces_and_unicode_pass_through() {
        let b = TemplateBindings::new().with("flag", "🇩🇪");
        assert_eq!(b.apply("{{flag}} ✓ {flag}"), "{🇩🇪} ✓ 🇩🇪");
        assert_eq!(b.apply("no tokens – ünïcode"), "no tokens – ünïcode");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut b: TemplateBindings = [("x", "1".to_string()), ("y", "2".to_string())]
            .into_iter()
            .collect();
        b.insert("x", "3");
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![("x", "3"), ("y", "2")]);
        assert!(b.contains("y"));
        assert!(!b.is_empty());
    }
}
