use std::collections::HashSet;

/// Naming state for one generation pass. Synthesized temporaries come out of
/// `distinct_name`; user-declared variables are registered up front with
/// `reserve` so a temporary can never shadow them.
#[derive(Debug, Default)]
pub struct NamePool {
    reserved: HashSet<String>,
    used: HashSet<String>,
}

impl NamePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a user-declared name as off limits for synthesized temporaries.
    pub fn reserve(&mut self, name: &str) {
        self.reserved.insert(name.to_string());
    }

    /// Returns `base` if it is still free, otherwise `base2`, `base3`, and so
    /// on. The returned name is recorded as issued for the rest of the pass.
    pub fn distinct_name(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 1usize;
        while self.is_taken(&candidate) {
            suffix += 1;
            candidate = format!("{}{}", base, suffix);
        }
        self.used.insert(candidate.clone());
        candidate
    }

    /// Clears all state. Each generation pass must start from a reset pool to
    /// keep its uniqueness guarantee.
    pub fn reset(&mut self) {
        self.reserved.clear();
        self.used.clear();
    }

    fn is_taken(&self, name: &str) -> bool {
        self.reserved.contains(name) || self.used.contains(name)
    }
}
