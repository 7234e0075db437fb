//! Equivalence representatives.
//!
//! Variables connected by equality constraints share one representative
//! record holding the member set. Representatives live in an arena
//! addressed by `RepId`; merging absorbs one record's members into the
//! other and tombstones the absorbed slot, so back-pointers are index
//! rewrites with no dangling-reference risk. Variables that never
//! participate in an equality constraint have no representative at all.

use crate::variables::CvId;

/// Handle to an equivalence representative.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepId(pub u32);

/// The shared record for a set of variables constrained to equal types.
#[derive(Clone, Debug, Default)]
pub struct EquivalenceRepresentative {
    members: Vec<CvId>,
}

impl EquivalenceRepresentative {
    /// Member variables, in insertion order.
    pub fn members(&self) -> &[CvId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, cv: CvId) -> bool {
        self.members.contains(&cv)
    }
}

/// Arena of representatives with tombstoned merged slots.
#[derive(Default)]
pub struct EquivalenceClasses {
    reps: Vec<Option<EquivalenceRepresentative>>,
}

impl EquivalenceClasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a representative containing exactly {a, b}.
    pub fn create(&mut self, a: CvId, b: CvId) -> RepId {
        let id = RepId(self.reps.len() as u32);
        self.reps.push(Some(EquivalenceRepresentative {
            members: vec![a, b],
        }));
        id
    }

    /// A live representative, or `None` for a merged-away slot.
    pub fn get(&self, id: RepId) -> Option<&EquivalenceRepresentative> {
        self.reps.get(id.0 as usize).and_then(|r| r.as_ref())
    }

    /// Add one member to a live representative.
    pub fn add_member(&mut self, id: RepId, cv: CvId) {
        let rep = self.reps[id.0 as usize]
            .as_mut()
            .expect("representative was merged away");
        rep.members.push(cv);
    }

    /// Absorb `from` into `into`, tombstoning `from`. Returns the absorbed
    /// members so the caller can rewrite their back-pointers.
    pub fn merge(&mut self, into: RepId, from: RepId) -> Vec<CvId> {
        assert_ne!(into, from, "cannot merge a representative into itself");
        let absorbed = self.reps[from.0 as usize]
            .take()
            .expect("representative was merged away")
            .members;
        let target = self.reps[into.0 as usize]
            .as_mut()
            .expect("representative was merged away");
        target.members.extend_from_slice(&absorbed);
        absorbed
    }

    /// Snapshot of the live representative ids.
    pub fn live(&self) -> Vec<RepId> {
        self.reps
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().map(|_| RepId(i as u32)))
            .collect()
    }
}
