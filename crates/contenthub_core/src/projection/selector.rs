//! Field selector parsing and effective field resolution.

use super::ProjectionError;
use crate::model::record::Record;

const PATH_SEPARATOR: char = '.';
const ALIAS_SEPARATOR: char = ':';
const RESERVED_MARKER: char = '_';

/// How a selector combines with the default field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorMode {
    /// No prefix: select exactly this field, discarding defaults.
    Only,
    /// `+`: add to the default field set.
    Include,
    /// `-`: remove from the default field set.
    Exclude,
}

/// One parsed `[+|-]path[:alias]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    mode: SelectorMode,
    path: Vec<String>,
    alias: Option<Vec<String>>,
}

impl Selector {
    /// Parses one selector.
    ///
    /// The path is the text before the first `:`, the alias the text after
    /// the last `:`.
    ///
    /// # Errors
    /// - Empty path, empty path segment or empty alias segment.
    /// - Alias on a `-` selector.
    pub fn parse(raw: &str) -> Result<Self, ProjectionError> {
        let invalid = |reason: &'static str| ProjectionError::InvalidSelector {
            selector: raw.to_string(),
            reason,
        };

        let (mode, body) = if let Some(rest) = raw.strip_prefix('+') {
            (SelectorMode::Include, rest)
        } else if let Some(rest) = raw.strip_prefix('-') {
            (SelectorMode::Exclude, rest)
        } else {
            (SelectorMode::Only, raw)
        };

        let (path_text, alias_text) = match body.split_once(ALIAS_SEPARATOR) {
            Some((path, rest)) => (path, rest.rsplit(ALIAS_SEPARATOR).next()),
            None => (body, None),
        };

        if path_text.is_empty() {
            return Err(invalid("path is empty"));
        }
        let path = split_segments(path_text).ok_or_else(|| invalid("path has an empty segment"))?;

        let alias = match alias_text {
            None => None,
            Some(_) if mode == SelectorMode::Exclude => {
                return Err(invalid("alias is not allowed on a `-` selector"));
            }
            Some(text) => {
                Some(split_segments(text).ok_or_else(|| invalid("alias has an empty segment"))?)
            }
        };

        Ok(Self { mode, path, alias })
    }

    /// Plain selector for one declared field.
    pub fn field(name: &str) -> Self {
        Self {
            mode: SelectorMode::Only,
            path: vec![name.to_string()],
            alias: None,
        }
    }

    pub fn mode(&self) -> SelectorMode {
        self.mode
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn alias(&self) -> Option<&[String]> {
        self.alias.as_deref()
    }

    /// Output location: the alias when given, the source path otherwise.
    pub fn destination(&self) -> &[String] {
        self.alias().unwrap_or(&self.path)
    }

    /// Whether any path segment uses the internal-field marker.
    pub fn is_reserved(&self) -> bool {
        self.path
            .iter()
            .any(|segment| segment.starts_with(RESERVED_MARKER))
    }

    fn same_target(&self, other: &Self) -> bool {
        self.path == other.path && self.alias == other.alias
    }
}

fn split_segments(text: &str) -> Option<Vec<String>> {
    let segments: Vec<String> = text.split(PATH_SEPARATOR).map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return None;
    }
    Some(segments)
}

/// Ordered, validated field specification.
///
/// An empty spec selects every declared field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    only: Vec<Selector>,
    include: Vec<Selector>,
    exclude: Vec<Selector>,
}

impl FieldSpec {
    /// Spec selecting every declared field.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parses every selector; the first invalid one rejects the whole spec.
    pub fn parse<I, S>(selectors: I) -> Result<Self, ProjectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut spec = Self::default();
        for raw in selectors {
            let selector = Selector::parse(raw.as_ref())?;
            match selector.mode {
                SelectorMode::Only => spec.only.push(selector),
                SelectorMode::Include => spec.include.push(selector),
                SelectorMode::Exclude => spec.exclude.push(selector),
            }
        }
        Ok(spec)
    }

    /// Parses a comma-separated request parameter such as `id,title:name`.
    ///
    /// Blank items are ignored, so `""` yields the default spec.
    pub fn from_param(param: &str) -> Result<Self, ProjectionError> {
        Self::parse(
            param
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty()),
        )
    }

    /// Whether no selector was given.
    pub fn is_default(&self) -> bool {
        self.only.is_empty() && self.include.is_empty() && self.exclude.is_empty()
    }

    /// Whether plain selectors replace the default field set.
    pub fn is_exclusive(&self) -> bool {
        !self.only.is_empty()
    }

    /// Resolves the selectors to evaluate against `record`, in output order.
    ///
    /// - Plain selectors present: exactly those, `+`/`-` ignored.
    /// - Otherwise: declared fields in declaration order, then `+` selectors,
    ///   minus every entry whose path matches a `-` selector.
    pub fn effective_selectors(&self, record: &dyn Record) -> Vec<Selector> {
        if self.is_exclusive() {
            return self.only.clone();
        }

        let mut selected: Vec<Selector> = record
            .field_names()
            .into_iter()
            .map(Selector::field)
            .collect();
        for added in &self.include {
            if !selected.iter().any(|existing| existing.same_target(added)) {
                selected.push(added.clone());
            }
        }
        selected.retain(|candidate| {
            !self
                .exclude
                .iter()
                .any(|removed| removed.path == candidate.path)
        });
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldSpec, Selector, SelectorMode};
    use crate::model::document::Document;
    use crate::projection::ProjectionError;

    fn paths(selectors: &[Selector]) -> Vec<String> {
        selectors
            .iter()
            .map(|selector| selector.path().join("."))
            .collect()
    }

    #[test]
    fn parse_reads_prefix_path_and_alias() {
        let selector = Selector::parse("+blog.id:blog.blog_id").unwrap();
        assert_eq!(selector.mode(), SelectorMode::Include);
        assert_eq!(selector.path(), ["blog", "id"]);
        assert_eq!(selector.destination(), ["blog", "blog_id"]);
    }

    #[test]
    fn alias_is_taken_after_last_colon() {
        let selector = Selector::parse("a:b:c").unwrap();
        assert_eq!(selector.path(), ["a"]);
        assert_eq!(selector.alias().unwrap(), ["c"]);
    }

    #[test]
    fn parse_rejects_malformed_selectors() {
        for raw in ["", "+", "a..b", ".a", "a:", "a:x.", ":x", "-a:b"] {
            let err = Selector::parse(raw).unwrap_err();
            assert!(
                matches!(err, ProjectionError::InvalidSelector { .. }),
                "`{raw}` should be rejected"
            );
        }
    }

    #[test]
    fn reserved_marker_applies_to_any_segment() {
        assert!(Selector::parse("_cls").unwrap().is_reserved());
        assert!(Selector::parse("blog._ref").unwrap().is_reserved());
        assert!(!Selector::parse("blog.ref_").unwrap().is_reserved());
    }

    #[test]
    fn one_invalid_selector_rejects_whole_spec() {
        assert!(FieldSpec::parse(["id", "a..b", "title"]).is_err());
    }

    #[test]
    fn from_param_trims_and_skips_blank_items() {
        let spec = FieldSpec::from_param(" id , ,title:name ").unwrap();
        let record = Document::new();
        assert_eq!(paths(&spec.effective_selectors(&record)), ["id", "title"]);
        assert!(FieldSpec::from_param("").unwrap().is_default());
    }

    #[test]
    fn plain_selectors_discard_modifiers() {
        let record = Document::new().with("a", 1_i64).with("b", 2_i64);
        let spec = FieldSpec::parse(["+c", "b", "-b"]).unwrap();
        assert_eq!(paths(&spec.effective_selectors(&record)), ["b"]);
    }

    #[test]
    fn modifiers_keep_declaration_order_and_removal_wins() {
        let record = Document::new()
            .with("c", 1_i64)
            .with("a", 2_i64)
            .with("b", 3_i64);
        let spec = FieldSpec::parse(["+x.y", "-a", "+a", "+c"]).unwrap();
        assert_eq!(paths(&spec.effective_selectors(&record)), ["c", "b", "x.y"]);
    }
}
