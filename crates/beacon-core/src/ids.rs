use chrono::Utc;

/// Generates record ids of the form `<prefix>_<unix millis>_<seq>`.
///
/// The sequence number makes ids unique even when several records are created
/// within the same millisecond.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    prefix: &'static str,
    seq: u64,
}

impl IdGenerator {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, seq: 0 }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format!("{}_{}_{}", self.prefix, Utc::now().timestamp_millis(), self.seq)
    }

    /// Returns the first generated id that `taken` rejects as unused.
    pub fn next_unused(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.next_id();
            if !taken(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_within_same_millisecond() {
        let mut ids = IdGenerator::new("alert");
        let generated: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 1000);
        assert!(generated.iter().all(|id| id.starts_with("alert_")));
    }

    #[test]
    fn test_next_unused_skips_taken_ids() {
        let mut ids = IdGenerator::new("c");
        let first = ids.clone().next_id();
        let picked = ids.next_unused(|id| id == first);
        assert_ne!(picked, first);
    }
}
