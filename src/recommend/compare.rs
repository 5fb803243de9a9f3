use super::ranker::RankedListing;

pub const MAX_COMPARE: usize = 2;

/// Up to two listing ids chosen for side-by-side comparison, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareSelection {
    ids: Vec<String>,
}

impl CompareSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `id` if selected, otherwise add it. Adding a third id drops the
    /// oldest one.
    pub fn toggle(&self, id: &str) -> Self {
        let mut ids = self.ids.clone();
        if let Some(pos) = ids.iter().position(|existing| existing == id) {
            ids.remove(pos);
        } else {
            ids.push(id.to_string());
            if ids.len() > MAX_COMPARE {
                ids.remove(0);
            }
        }
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The compare view only opens with exactly two ids selected.
    pub fn is_ready(&self) -> bool {
        self.ids.len() == MAX_COMPARE
    }

    /// Selected listings in ranked order, at most two.
    pub fn pick<'a>(&self, ranked: &'a [RankedListing]) -> Vec<&'a RankedListing> {
        ranked
            .iter()
            .filter(|r| self.contains(&r.listing.id))
            .take(MAX_COMPARE)
            .collect()
    }
}
