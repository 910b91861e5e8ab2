//! Single-attribute value matchers.

/// Matcher over one attribute's value space.
///
/// Values are kept in first-seen order so that anything derived from them
/// (known states, diagram edges) is deterministic.
///
/// # Example
///
/// ```rust
/// use statewise::core::Requirement;
///
/// let only_on = Requirement::whitelist([Some("on")]);
/// assert!(only_on.matches(&Some("on")));
/// assert!(!only_on.matches(&None));
///
/// let not_off = Requirement::blacklist([Some("off")]);
/// assert!(not_off.matches(&None));
/// assert!(!not_off.matches(&Some("off")));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Requirement<T> {
    /// Every value matches.
    #[default]
    All,
    /// Only the listed values match.
    Whitelist(Vec<T>),
    /// Every value except the listed ones matches.
    Blacklist(Vec<T>),
}

impl<T: Clone + PartialEq> Requirement<T> {
    /// Whitelist over `values`, duplicates removed.
    pub fn whitelist(values: impl IntoIterator<Item = T>) -> Self {
        Self::Whitelist(dedup(values))
    }

    /// Blacklist over `values`, duplicates removed.
    pub fn blacklist(values: impl IntoIterator<Item = T>) -> Self {
        Self::Blacklist(dedup(values))
    }

    /// Check a single value against this requirement.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Whitelist(values) => values.contains(value),
            Self::Blacklist(values) => !values.contains(value),
        }
    }

    /// The values this requirement references. Empty for [`Requirement::All`].
    pub fn values(&self) -> &[T] {
        match self {
            Self::All => &[],
            Self::Whitelist(values) | Self::Blacklist(values) => values,
        }
    }

    /// Keep the members of `universe` this requirement accepts, in universe order.
    pub fn filter(&self, universe: &[T]) -> Vec<T> {
        universe
            .iter()
            .filter(|value| self.matches(value))
            .cloned()
            .collect()
    }
}

pub(crate) fn dedup<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}
