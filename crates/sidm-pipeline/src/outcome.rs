//! Per-(process, file) rule outcomes.

/// Result of evaluating one rule binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Matched,
    NotMatched,
    /// The unit failed; gating treats this as `false`.
    Errored(String),
}

impl RuleOutcome {
    /// Boolean view used for gating.
    pub fn is_true(&self) -> bool {
        matches!(self, RuleOutcome::Matched)
    }
}

impl From<bool> for RuleOutcome {
    fn from(value: bool) -> Self {
        if value {
            RuleOutcome::Matched
        } else {
            RuleOutcome::NotMatched
        }
    }
}

/// Rule name to outcome, in declared rule order.
///
/// Scoped to a single evaluation; never merged across files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleResults {
    entries: Vec<(String, RuleOutcome)>,
}

impl RuleResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome. A later record for the same name replaces the
    /// earlier one in place.
    pub fn record(&mut self, name: impl Into<String>, outcome: RuleOutcome) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = outcome,
            None => self.entries.push((name, outcome)),
        }
    }

    /// Outcome for a rule, if it was evaluated.
    pub fn get(&self, name: &str) -> Option<&RuleOutcome> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    /// Whether `name` evaluated to true. Absent names are false.
    pub fn is_true(&self, name: &str) -> bool {
        self.get(name).is_some_and(RuleOutcome::is_true)
    }

    /// Whether at least one rule matched.
    pub fn any_true(&self) -> bool {
        self.entries.iter().any(|(_, outcome)| outcome.is_true())
    }

    /// Logical AND over `conditions`; the empty set is true.
    pub fn all_true<S: AsRef<str>>(&self, conditions: &[S]) -> bool {
        conditions.iter().all(|c| self.is_true(c.as_ref()))
    }

    /// Conditions that do not hold, in the order given.
    pub fn unmet<'a, S: AsRef<str>>(&self, conditions: &'a [S]) -> Vec<&'a str> {
        conditions
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| !self.is_true(c))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleOutcome)> {
        self.entries.iter().map(|(n, o)| (n.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
