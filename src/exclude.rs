//! Rules deciding which elements are dropped before encoding
use crate::{Element, Paint, element::Path};

/// Predicate over elements, `true` means the element is dropped
pub trait ElementFilter {
    fn excludes(&self, element: &Element) -> bool;
}

impl<F> ElementFilter for F
where
    F: Fn(&Element) -> bool,
{
    fn excludes(&self, element: &Element) -> bool {
        self(element)
    }
}

/// Single exclusion rule
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "rule", content = "element", rename_all = "snake_case")
)]
pub enum ExcludeRule {
    /// Elements with `fill="none"`
    FillNone,
    /// Elements structurally equal to the given one, opacity is ignored
    Exact(Element),
}

impl ExcludeRule {
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            ExcludeRule::FillNone => element.paint().is_none(),
            ExcludeRule::Exact(excluded) => excluded == element,
        }
    }
}

impl ElementFilter for ExcludeRule {
    fn excludes(&self, element: &Element) -> bool {
        self.matches(element)
    }
}

/// Ordered set of exclusion rules, element is excluded if any rule matches
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Exclusions {
    rules: Vec<ExcludeRule>,
}

impl Default for Exclusions {
    /// Drop unfilled elements and the 24x24 bounding box frame common in icon sets
    fn default() -> Self {
        Self {
            rules: vec![
                ExcludeRule::FillNone,
                ExcludeRule::Exact(Element::Path(Path::new(
                    "M0 0h24v24H0V0z",
                    Paint::default(),
                ))),
            ],
        }
    }
}

impl Exclusions {
    pub fn new(rules: Vec<ExcludeRule>) -> Self {
        Self { rules }
    }

    /// Empty rule set, nothing is excluded
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[ExcludeRule] {
        &self.rules
    }

    pub fn push(&mut self, rule: ExcludeRule) {
        self.rules.push(rule);
    }

    /// Replace all rules, including the default ones, with exact element matches
    pub fn replace(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.rules = elements.into_iter().map(ExcludeRule::Exact).collect();
    }

    /// Append exact element matches to the existing rules
    pub fn extend_exact(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.rules
            .extend(elements.into_iter().map(ExcludeRule::Exact));
    }

    /// First rule matching the element
    pub fn matching(&self, element: &Element) -> Option<&ExcludeRule> {
        self.rules.iter().find(|rule| rule.matches(element))
    }
}

impl ElementFilter for Exclusions {
    fn excludes(&self, element: &Element) -> bool {
        self.matching(element).is_some()
    }
}

impl Extend<ExcludeRule> for Exclusions {
    fn extend<T: IntoIterator<Item = ExcludeRule>>(&mut self, iter: T) {
        self.rules.extend(iter)
    }
}

impl FromIterator<ExcludeRule> for Exclusions {
    fn from_iter<T: IntoIterator<Item = ExcludeRule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
