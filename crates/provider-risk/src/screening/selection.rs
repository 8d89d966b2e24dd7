use serde::{Serialize, Serializer};

use super::sources::{ALL_SOURCES_ID, MAX_EXPLICIT_SOURCES};

/// Sources chosen for one screening session.
///
/// Either the `"all"` sentinel alone, or up to three explicit source ids in
/// the order they were picked. The only way to change a selection is
/// [`Selection::toggle`], which keeps those invariants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    choice: Choice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    AllSources,
    Explicit(Vec<String>),
}

impl Default for Choice {
    fn default() -> Self {
        Choice::Explicit(Vec::new())
    }
}

/// What a non-empty selection asks the aggregator to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPlan<'a> {
    AllSources,
    PerSource(&'a [String]),
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all_sources() -> Self {
        Self {
            choice: Choice::AllSources,
        }
    }

    /// Applies successive toggles starting from an empty selection.
    pub fn from_toggles<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .fold(Self::empty(), |selection, id| selection.toggle(id.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.choice, Choice::Explicit(ids) if ids.is_empty())
    }

    pub fn is_all_sources(&self) -> bool {
        matches!(self.choice, Choice::AllSources)
    }

    /// Number of ids in the selection, counting the sentinel as one.
    pub fn len(&self) -> usize {
        match &self.choice {
            Choice::AllSources => 1,
            Choice::Explicit(ids) => ids.len(),
        }
    }

    pub fn contains(&self, source_id: &str) -> bool {
        match &self.choice {
            Choice::AllSources => source_id == ALL_SOURCES_ID,
            Choice::Explicit(ids) => ids.iter().any(|id| id == source_id),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        match &self.choice {
            Choice::AllSources => vec![ALL_SOURCES_ID],
            Choice::Explicit(ids) => ids.iter().map(String::as_str).collect(),
        }
    }

    pub fn plan(&self) -> Option<LookupPlan<'_>> {
        match &self.choice {
            Choice::AllSources => Some(LookupPlan::AllSources),
            Choice::Explicit(ids) if ids.is_empty() => None,
            Choice::Explicit(ids) => Some(LookupPlan::PerSource(ids)),
        }
    }

    /// Returns the selection that results from clicking `source_id`.
    pub fn toggle(&self, source_id: &str) -> Selection {
        if source_id == ALL_SOURCES_ID {
            return if self.is_all_sources() {
                Selection::empty()
            } else {
                Selection::all_sources()
            };
        }

        let mut ids = match &self.choice {
            Choice::AllSources => Vec::new(),
            Choice::Explicit(ids) => ids.clone(),
        };

        if let Some(position) = ids.iter().position(|id| id == source_id) {
            ids.remove(position);
        } else if ids.len() >= MAX_EXPLICIT_SOURCES {
            return self.clone();
        } else {
            ids.push(source_id.to_string());
        }

        Selection {
            choice: Choice::Explicit(ids),
        }
    }

    /// Whether the option for `source_id` should refuse clicks.
    pub fn is_disabled(&self, source_id: &str) -> bool {
        if source_id == ALL_SOURCES_ID {
            return false;
        }

        match &self.choice {
            Choice::AllSources => true,
            Choice::Explicit(ids) => {
                ids.len() >= MAX_EXPLICIT_SOURCES && !ids.iter().any(|id| id == source_id)
            }
        }
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_adds_and_removes_in_pick_order() {
        let selection = Selection::from_toggles(["world-bank", "ofac"]);
        assert_eq!(selection.ids(), vec!["world-bank", "ofac"]);

        let selection = selection.toggle("world-bank");
        assert_eq!(selection.ids(), vec!["ofac"]);
    }

    #[test]
    fn fourth_explicit_source_is_a_no_op() {
        let selection = Selection::from_toggles(["ofac", "world-bank", "offshore-leaks"]);
        let toggled = selection.toggle("eu-sanctions");
        assert_eq!(toggled, selection);
        assert_eq!(toggled.len(), 3);
    }

    #[test]
    fn sentinel_replaces_explicit_choices() {
        let selection = Selection::from_toggles(["ofac", "world-bank"]).toggle(ALL_SOURCES_ID);
        assert!(selection.is_all_sources());
        assert_eq!(selection.ids(), vec![ALL_SOURCES_ID]);
    }

    #[test]
    fn explicit_choice_replaces_the_sentinel() {
        let selection = Selection::all_sources().toggle("offshore-leaks");
        assert!(!selection.is_all_sources());
        assert_eq!(selection.ids(), vec!["offshore-leaks"]);
    }

    #[test]
    fn toggling_the_active_sentinel_clears_the_selection() {
        let selection = Selection::all_sources().toggle(ALL_SOURCES_ID);
        assert!(selection.is_empty());
        assert!(selection.plan().is_none());
    }

    #[test]
    fn cardinality_invariant_holds_for_arbitrary_click_sequences() {
        let ids = ["ofac", "all", "world-bank", "offshore-leaks", "eu", "ofac", "un", "all"];
        let mut selection = Selection::empty();
        for round in 0..64usize {
            let id = ids[(round * 7 + round / 3) % ids.len()];
            selection = selection.toggle(id);

            let chosen = selection.ids();
            if selection.is_all_sources() {
                assert_eq!(chosen, vec![ALL_SOURCES_ID]);
            } else {
                assert!(chosen.len() <= MAX_EXPLICIT_SOURCES);
                assert!(!chosen.contains(&ALL_SOURCES_ID));
            }
        }
    }

    #[test]
    fn disabled_rules_follow_the_selection() {
        let all = Selection::all_sources();
        assert!(!all.is_disabled(ALL_SOURCES_ID));
        assert!(all.is_disabled("ofac"));

        let full = Selection::from_toggles(["ofac", "world-bank", "offshore-leaks"]);
        assert!(!full.is_disabled("ofac"));
        assert!(full.is_disabled("eu-sanctions"));
        assert!(!full.is_disabled(ALL_SOURCES_ID));

        let partial = Selection::from_toggles(["ofac"]);
        assert!(!partial.is_disabled("world-bank"));
    }

    #[test]
    fn plan_reflects_the_selection_mode() {
        assert_eq!(Selection::all_sources().plan(), Some(LookupPlan::AllSources));

        let selection = Selection::from_toggles(["ofac", "world-bank"]);
        match selection.plan() {
            Some(LookupPlan::PerSource(ids)) => assert_eq!(ids.to_vec(), vec!["ofac", "world-bank"]),
            other => panic!("expected per-source plan, got {other:?}"),
        }
    }

    #[test]
    fn serializes_as_an_id_list() {
        let selection = Selection::from_toggles(["world-bank", "ofac"]);
        let json = serde_json::to_value(&selection).expect("serializes");
        assert_eq!(json, serde_json::json!(["world-bank", "ofac"]));
    }
}
