use fancy_regex::Regex;
use tracing::{debug, warn};

use crate::types::TransferTask;

const FILTER_NAME: &str = "KeyFilter";

/// Admits candidates whose key matches the configured pattern (search semantics).
/// Without a pattern every candidate is admitted.
#[derive(Debug, Clone, Default)]
pub struct KeyFilter {
    key_match: Option<Regex>,
}

impl KeyFilter {
    pub fn new(key_match: Option<Regex>) -> Self {
        Self { key_match }
    }

    pub fn is_match(&self, key: &str) -> bool {
        let Some(key_match) = self.key_match.as_ref() else {
            return true;
        };

        match key_match.is_match(key) {
            Ok(true) => true,
            Ok(false) => {
                debug!(
                    name = FILTER_NAME,
                    key = key,
                    key_match = key_match.as_str(),
                    "object filtered."
                );
                false
            }
            // backtrack limit exceeded
            Err(e) => {
                warn!(
                    name = FILTER_NAME,
                    key = key,
                    key_match = key_match.as_str(),
                    error = e.to_string(),
                    "key match failed. object filtered."
                );
                false
            }
        }
    }

    pub fn apply(&self, candidates: Vec<TransferTask>) -> Vec<TransferTask> {
        if self.key_match.is_none() {
            return candidates;
        }

        candidates
            .into_iter()
            .filter(|candidate| self.is_match(&candidate.key))
            .collect()
    }
}
