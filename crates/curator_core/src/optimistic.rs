use std::collections::BTreeMap;
use std::fmt;

use crate::{Company, CompanyId, Page};

/// A company field that can be changed locally ahead of the server.
pub trait OptimisticField {
    type Value: Clone + PartialEq + fmt::Debug;

    fn read(company: &Company) -> Self::Value;
    fn write(company: &mut Company, value: Self::Value);
}

/// Membership in the favorites collection.
#[derive(Debug, Clone, Copy)]
pub struct Liked;

impl OptimisticField for Liked {
    type Value = bool;

    fn read(company: &Company) -> bool {
        company.liked
    }

    fn write(company: &mut Company, value: bool) {
        company.liked = value;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation<V> {
    pub ticket: u64,
    pub company_id: CompanyId,
    pub previous: V,
    pub desired: V,
}

/// Value the server is known to hold for a company, tagged with the ticket
/// that established it. Ticket 0 marks the snapshot taken before any toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Acknowledged<V> {
    ticket: u64,
    value: V,
}

/// In-flight optimistic writes, keyed by ticket so each completion finds its
/// own snapshot. Toggles on the same company are not coalesced.
///
/// Once a ticket settles, the field shows the newer of the company's latest
/// pending write and its latest acknowledged value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationLedger<V> {
    pending: BTreeMap<u64, PendingMutation<V>>,
    acknowledged: BTreeMap<CompanyId, Acknowledged<V>>,
    next_ticket: u64,
}

impl<V> Default for MutationLedger<V> {
    fn default() -> Self {
        Self {
            pending: BTreeMap::new(),
            acknowledged: BTreeMap::new(),
            next_ticket: 0,
        }
    }
}

impl<V: Clone + PartialEq + fmt::Debug> MutationLedger<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current value and write `desired` into the page copy.
    pub fn apply<F>(
        &mut self,
        page: &mut Page,
        company_id: CompanyId,
        desired: V,
    ) -> Option<PendingMutation<V>>
    where
        F: OptimisticField<Value = V>,
    {
        let company = page.company_mut(company_id)?;
        let previous = F::read(company);
        F::write(company, desired.clone());

        self.acknowledged
            .entry(company_id)
            .or_insert_with(|| Acknowledged {
                ticket: 0,
                value: previous.clone(),
            });
        self.next_ticket += 1;
        let pending = PendingMutation {
            ticket: self.next_ticket,
            company_id,
            previous,
            desired,
        };
        self.pending.insert(pending.ticket, pending.clone());
        Some(pending)
    }

    pub fn confirm<F>(
        &mut self,
        page: Option<&mut Page>,
        ticket: u64,
    ) -> Option<PendingMutation<V>>
    where
        F: OptimisticField<Value = V>,
    {
        let pending = self.pending.remove(&ticket)?;
        if let Some(acknowledged) = self.acknowledged.get_mut(&pending.company_id) {
            if acknowledged.ticket < ticket {
                *acknowledged = Acknowledged {
                    ticket,
                    value: pending.desired.clone(),
                };
            }
        }
        self.settle::<F>(page, pending.company_id);
        Some(pending)
    }

    /// Drop the ticket and fall back to whatever the company's other tickets
    /// say; an older rejection never overwrites a newer acknowledgement.
    pub fn rollback<F>(
        &mut self,
        page: Option<&mut Page>,
        ticket: u64,
    ) -> Option<PendingMutation<V>>
    where
        F: OptimisticField<Value = V>,
    {
        let pending = self.pending.remove(&ticket)?;
        self.settle::<F>(page, pending.company_id);
        Some(pending)
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    fn settle<F>(&mut self, page: Option<&mut Page>, company_id: CompanyId)
    where
        F: OptimisticField<Value = V>,
    {
        let latest_pending = self
            .pending
            .values()
            .rev()
            .find(|p| p.company_id == company_id);
        let resolved = match (latest_pending, self.acknowledged.get(&company_id)) {
            (Some(p), Some(ack)) if ack.ticket > p.ticket => Some(ack.value.clone()),
            (Some(p), _) => Some(p.desired.clone()),
            (None, Some(ack)) => Some(ack.value.clone()),
            (None, None) => None,
        };
        if latest_pending.is_none() {
            self.acknowledged.remove(&company_id);
        }

        if let (Some(value), Some(company)) =
            (resolved, page.and_then(|p| p.company_mut(company_id)))
        {
            F::write(company, value);
        }
    }
}
