//! Common ancestor finder for merge operations
//!
//! Two frontiers walk back from the two tips along first-parent edges, one hop
//! each per round, source side first. Before a frontier marks a commit it
//! checks whether the other side has already visited it; the first such
//! commit is the merge base. The side advancing in that step wins, so when
//! both sides would reach a candidate in the same round the source side
//! reports it.
//!
//! Histories that share no commit exhaust both frontiers and yield `None`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let finder = CommonAncestorFinder::new(|oid| graph.parent_of(oid));
//! let base = finder.find(&ours, &theirs)?;
//! ```

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use bitflags::bitflags;
use std::collections::HashMap;
use std::fmt;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

/// Finds the merge base of two commits
///
/// Generic over the parent loader so the walk can run against the object
/// database or an in-memory graph.
#[derive(Debug, Clone)]
pub struct CommonAncestorFinder<ParentLoaderFn>
where
    ParentLoaderFn: Fn(&ObjectId) -> Result<Option<ObjectId>>,
{
    /// Returns the first parent of a commit, `None` for a root
    parent_loader: ParentLoaderFn,
}

impl<ParentLoaderFn> CommonAncestorFinder<ParentLoaderFn>
where
    ParentLoaderFn: Fn(&ObjectId) -> Result<Option<ObjectId>>,
{
    pub fn new(parent_loader: ParentLoaderFn) -> Self {
        Self { parent_loader }
    }

    pub fn find(&self, source: &ObjectId, target: &ObjectId) -> Result<Option<ObjectId>> {
        let mut states = HashMap::<ObjectId, VisitState>::new();
        let mut source_frontier = Some(source.clone());
        let mut target_frontier = Some(target.clone());

        while source_frontier.is_some() || target_frontier.is_some() {
            if let Some(found) = self.advance(
                &mut source_frontier,
                VisitState::VISITED_FROM_SOURCE,
                VisitState::VISITED_FROM_TARGET,
                &mut states,
            )? {
                return Ok(Some(found));
            }

            if let Some(found) = self.advance(
                &mut target_frontier,
                VisitState::VISITED_FROM_TARGET,
                VisitState::VISITED_FROM_SOURCE,
                &mut states,
            )? {
                return Ok(Some(found));
            }
        }

        tracing::debug!(%source, %target, visited = states.len(), "histories are disjoint");
        Ok(None)
    }

    /// Visit the commit at `frontier` and step it to its first parent
    ///
    /// Returns the commit if the other side got there first.
    fn advance(
        &self,
        frontier: &mut Option<ObjectId>,
        side: VisitState,
        other_side: VisitState,
        states: &mut HashMap<ObjectId, VisitState>,
    ) -> Result<Option<ObjectId>> {
        let Some(current) = frontier.take() else {
            return Ok(None);
        };

        let state = states.entry(current.clone()).or_insert(VisitState::empty());
        if state.contains(other_side) {
            tracing::debug!(ancestor = %current, "common ancestor found");
            return Ok(Some(current));
        }
        state.insert(side);
        tracing::trace!(oid = %current, state = ?*state, "visited");

        *frontier = (self.parent_loader)(&current)?;
        Ok(None)
    }
}
