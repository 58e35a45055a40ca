//! Navigation Context Carrier.
//!
//! A browse view hands the derived view it was showing to the detail view
//! together with the selected id. The detail view only uses that sequence to
//! find its neighbours, and every previous/next hop passes the same sequence
//! on unchanged.

use serde::{Deserialize, Serialize};

use crate::model::{RecordId, RecordSequence};

/// Outbound "navigate to this record" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub target: RecordId,
    pub context: Option<RecordSequence>,
}

impl NavigationRequest {
    /// `context` is shared, not copied.
    #[must_use]
    pub fn with_context(target: RecordId, context: RecordSequence) -> Self {
        Self {
            target,
            context: Some(context),
        }
    }

    /// Navigation without a carried sequence, e.g. a deep link.
    #[must_use]
    pub const fn direct(target: RecordId) -> Self {
        Self {
            target,
            context: None,
        }
    }
}

/// Which relative moves are available from the current record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbours {
    pub has_previous: bool,
    pub has_next: bool,
}

/// The detail view's side of the carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailNavigator {
    target: RecordId,
    context: Option<RecordSequence>,
    position: Option<usize>,
}

impl DetailNavigator {
    #[must_use]
    pub fn arrive(request: NavigationRequest) -> Self {
        let position = request
            .context
            .as_ref()
            .and_then(|sequence| sequence.position_of(request.target));
        Self {
            target: request.target,
            context: request.context,
            position,
        }
    }

    #[must_use]
    pub const fn target(&self) -> RecordId {
        self.target
    }

    /// Index of the target in the carried sequence. `None` without context
    /// or when the target is not part of it.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        self.position
    }

    #[must_use]
    pub fn context(&self) -> Option<&RecordSequence> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        match (self.position, &self.context) {
            (Some(p), Some(sequence)) => p + 1 < sequence.len(),
            _ => false,
        }
    }

    #[must_use]
    pub fn neighbours(&self) -> Neighbours {
        Neighbours {
            has_previous: self.has_previous(),
            has_next: self.has_next(),
        }
    }

    /// Request for the preceding record, re-passing the carried sequence.
    #[must_use]
    pub fn previous(&self) -> Option<NavigationRequest> {
        let position = self.position.filter(|p| *p > 0)?;
        self.hop(position - 1)
    }

    /// Request for the following record, re-passing the carried sequence.
    #[must_use]
    pub fn next(&self) -> Option<NavigationRequest> {
        let position = self.position?;
        self.hop(position + 1)
    }

    fn hop(&self, position: usize) -> Option<NavigationRequest> {
        let sequence = self.context.as_ref()?;
        let record = sequence.get(position)?;
        Some(NavigationRequest::with_context(record.id, sequence.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::record;
    use std::sync::Arc;

    fn five() -> RecordSequence {
        RecordSequence::from(
            (1..=5)
                .map(|id| Arc::new(record(id * 10, &format!("mon{id}"), &["normal"])))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn middle_record_has_both_neighbours() {
        let sequence = five();
        let nav = DetailNavigator::arrive(NavigationRequest::with_context(RecordId(30), sequence));

        assert_eq!(nav.position(), Some(2));
        assert_eq!(nav.previous().map(|r| r.target), Some(RecordId(20)));
        assert_eq!(nav.next().map(|r| r.target), Some(RecordId(40)));
    }

    #[test]
    fn first_record_cannot_go_back() {
        let nav = DetailNavigator::arrive(NavigationRequest::with_context(RecordId(10), five()));
        assert!(!nav.has_previous());
        assert!(nav.has_next());
        assert!(nav.previous().is_none());
    }

    #[test]
    fn last_record_cannot_go_forward() {
        let nav = DetailNavigator::arrive(NavigationRequest::with_context(RecordId(50), five()));
        assert!(nav.has_previous());
        assert!(!nav.has_next());
        assert!(nav.next().is_none());
    }

    #[test]
    fn hops_re_pass_the_same_sequence() {
        let sequence = five();
        let mut nav = DetailNavigator::arrive(NavigationRequest::with_context(
            RecordId(10),
            sequence.clone(),
        ));

        for expected in [20, 30, 40, 50] {
            let request = nav.next().unwrap();
            assert_eq!(request.target, RecordId(expected));
            assert!(request.context.as_ref().unwrap().ptr_eq(&sequence));
            nav = DetailNavigator::arrive(request);
        }
        assert!(nav.next().is_none());
    }

    #[test]
    fn direct_navigation_disables_both_directions() {
        let nav = DetailNavigator::arrive(NavigationRequest::direct(RecordId(3)));
        assert_eq!(nav.neighbours(), Neighbours::default());
        assert!(nav.previous().is_none());
        assert!(nav.next().is_none());
    }

    #[test]
    fn empty_context_disables_both_directions() {
        let nav = DetailNavigator::arrive(NavigationRequest::with_context(
            RecordId(3),
            RecordSequence::empty(),
        ));
        assert_eq!(nav.position(), None);
        assert!(!nav.has_previous());
        assert!(!nav.has_next());
    }

    #[test]
    fn target_outside_context_disables_both_directions() {
        let nav = DetailNavigator::arrive(NavigationRequest::with_context(RecordId(99), five()));
        assert_eq!(nav.position(), None);
        assert_eq!(nav.neighbours(), Neighbours::default());
    }
}
