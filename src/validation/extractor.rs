//! Field reference extraction from Tera template source.
//!
//! This is a surface-syntax scan, not a parse of the template grammar. It
//! finds the top-level context fields a template reads so they can be checked
//! against the shape of the bound data type.
//!
//! # Recognised references
//!
//! - Output expressions that are a bare path, optionally piped through
//!   filters: `{{ Title }}`, `{{- Author.Name -}}`, `{{ Title | upper }}`
//! - Conditions that are a bare path: `{% if SubTitle %}`, `{% elif Flag %}`,
//!   `{% if not Draft %}`
//!
//! # Skipped content
//!
//! - Comments (`{# ... #}`) and `{% raw %}` blocks
//! - Macro bodies, which have their own scope
//! - Paths rooted at a locally bound name while that name is in scope: `for`
//!   loop variables inside the loop body, `set` and `set_global` targets after
//!   their tag, and Tera's `loop` builtin
//!
//! Anything more complex (arithmetic, comparisons, function calls) is left to
//! the engine at render time.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::RESERVED_NAMES;

/// Identifier path: `name(.name)*`.
const PATH: &str = r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*";

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{#.*?#\}").expect("comment pattern is valid"));

static RAW_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{%-?\s*raw\s*-?%\}.*?\{%-?\s*endraw\s*-?%\}").expect("raw pattern is valid")
});

static MACRO_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{%-?\s*macro\s.*?\{%-?\s*endmacro\b[^%]*%\}").expect("macro pattern is valid")
});

static OUTPUT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\{{\{{-?\s*({PATH})\s*(?:\|[^}}]*)?-?\}}\}}"))
        .expect("output pattern is valid")
});

static CONDITION_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\{{%-?\s*(?:if|elif)\s+(?:not\s+)?({PATH})\s*-?%\}}"))
        .expect("condition pattern is valid")
});

/// Opening `for` tag (with its bound names) or closing `endfor` tag.
static LOOP_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\{%-?\s*(?:(endfor)\b|for\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*,\s*([A-Za-z_][A-Za-z0-9_]*))?\s+in\b)",
    )
    .expect("loop pattern is valid")
});

static SET_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%-?\s*(set|set_global)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=")
        .expect("set pattern is valid")
});

/// A dotted path of field names, e.g. `Author.Name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The individual field names, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The first segment, i.e. the name looked up in the template context.
    pub fn head(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Extract the distinct top-level field paths referenced by `source`.
///
/// Paths are returned in order of first appearance, output expressions before
/// conditions. A template without references yields an empty list.
///
/// ```rust
/// use templator::validation::extract_field_paths;
///
/// let source = "{% if SubTitle %}<h2>{{ SubTitle }}</h2>{% endif %}\
///               {% for tag in Tags %}{{ tag.Name }}{% endfor %}";
/// let paths: Vec<String> = extract_field_paths(source)
///     .into_iter()
///     .map(|p| p.to_string())
///     .collect();
/// assert_eq!(paths, ["SubTitle"]);
/// ```
#[must_use]
pub fn extract_field_paths(source: &str) -> Vec<FieldPath> {
    let stripped = strip_unscoped(source);
    let bound = bindings(&stripped);

    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    let output = OUTPUT_REF.captures_iter(&stripped);
    let conditions = CONDITION_REF.captures_iter(&stripped);
    for cap in output.chain(conditions) {
        let Some(m) = cap.get(1) else { continue };
        let path = FieldPath::new(m.as_str());
        let head = path.head();
        if RESERVED_NAMES.contains(&head) || is_bound(&bound, head, m.start()) {
            continue;
        }
        if seen.insert(path.clone()) {
            paths.push(path);
        }
    }

    tracing::trace!(
        target: "templator::validation",
        "Extracted {} field path(s), {} local binding(s)",
        paths.len(),
        bound.len()
    );
    paths
}

/// Remove regions whose references are not resolved against the context.
fn strip_unscoped(source: &str) -> String {
    let without_comments = COMMENT.replace_all(source, "");
    let without_raw = RAW_BLOCK.replace_all(&without_comments, "");
    MACRO_BLOCK.replace_all(&without_raw, "").into_owned()
}

/// A name introduced by the template itself, visible within `scope`.
#[derive(Debug)]
struct Binding {
    name: String,
    scope: Range<usize>,
}

/// Local bindings with the byte range in which each one is visible.
///
/// Loop variables are visible inside their `for` body. A `set` target is
/// visible from its tag to the end of the innermost enclosing loop, or to the
/// end of the template at top level; `set_global` always reaches the end.
fn bindings(source: &str) -> Vec<Binding> {
    let mut bindings = Vec::new();
    let mut open: Vec<(Vec<String>, usize)> = Vec::new();
    let mut bodies: Vec<Range<usize>> = Vec::new();

    for cap in LOOP_TAG.captures_iter(source) {
        let Some(tag) = cap.get(0) else { continue };
        if cap.get(1).is_some() {
            if let Some((names, start)) = open.pop() {
                close_loop(&mut bindings, &mut bodies, names, start..tag.start());
            }
            continue;
        }
        let names = [cap.get(2), cap.get(3)]
            .into_iter()
            .flatten()
            .map(|m| m.as_str().to_string())
            .collect();
        let body_start = source[tag.end()..]
            .find("%}")
            .map_or(tag.end(), |offset| tag.end() + offset + 2);
        open.push((names, body_start));
    }
    // An unclosed loop runs to the end; the engine rejects it at compile time.
    while let Some((names, start)) = open.pop() {
        close_loop(&mut bindings, &mut bodies, names, start..source.len());
    }

    for cap in SET_BINDING.captures_iter(source) {
        let (Some(kind), Some(name)) = (cap.get(1), cap.get(2)) else { continue };
        let start = kind.start();
        let end = if kind.as_str() == "set_global" {
            source.len()
        } else {
            bodies
                .iter()
                .filter(|body| body.contains(&start))
                .map(|body| body.end)
                .min()
                .unwrap_or(source.len())
        };
        bindings.push(Binding {
            name: name.as_str().to_string(),
            scope: start..end,
        });
    }

    bindings
}

fn close_loop(
    bindings: &mut Vec<Binding>,
    bodies: &mut Vec<Range<usize>>,
    names: Vec<String>,
    body: Range<usize>,
) {
    bindings.extend(names.into_iter().map(|name| Binding {
        name,
        scope: body.clone(),
    }));
    bodies.push(body);
}

fn is_bound(bindings: &[Binding], name: &str, offset: usize) -> bool {
    bindings
        .iter()
        .any(|binding| binding.name == name && binding.scope.contains(&offset))
}
