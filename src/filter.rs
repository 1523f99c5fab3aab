/// Compiled allow/disallow substring rules.
///
/// An empty allow list means every name passes the allow stage. Disallow
/// always wins over allow. Matching is case-sensitive substring containment.
#[derive(Debug, Clone)]
pub struct FilterSet {
    match_all: bool,
    allow: Vec<String>,
    disallow: Vec<String>,
}

impl FilterSet {
    pub fn new(allow: &[String], disallow: &[String]) -> Self {
        Self {
            match_all: allow.is_empty(),
            allow: allow.to_vec(),
            disallow: disallow.to_vec(),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        let allowed = self.match_all || self.allow.iter().any(|term| candidate.contains(term.as_str()));
        allowed && !self.disallow.iter().any(|term| candidate.contains(term.as_str()))
    }

    /// Keeps the candidates that match, in their original order.
    pub fn apply<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        candidates
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| self.matches(c))
            .map(str::to_string)
            .collect()
    }
}
