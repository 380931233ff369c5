//! Memoized derived-state graph.
//!
//! Two node kinds live in one arena:
//!
//! - [`Root`] slots hold values written by the collaborator. A root starts
//!   out pending and stays that way until its first write.
//! - [`Family`] nodes compute a value from other nodes, one memo entry per
//!   distinct parameter. A [`Selector`] is a family without a parameter.
//!
//! Every write stamps the root with a fresh revision. A memo entry records
//! the stamp of each root read while computing it, including reads made
//! through nested derived nodes, and is reused only while all of those
//! stamps are unchanged. Nothing is computed until it is read. A write also
//! drops every memo entry that read the written root, so stale values are
//! not kept alive.
//!
//! Writes need `&mut Graph` and reads need `&Graph`, so a computation always
//! sees one consistent snapshot of its roots.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::error::{Result, StateError};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Outcome of observing a node.
#[derive(Clone, Debug, PartialEq)]
pub enum Loadable<T> {
    Ready(T),
    /// Some root this node depends on has not been written yet.
    Pending,
    Failed(StateError),
}

impl<T> Loadable<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Loadable::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Loadable::Pending)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Loadable::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&StateError> {
        match self {
            Loadable::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loadable<U> {
        match self {
            Loadable::Ready(v) => Loadable::Ready(f(v)),
            Loadable::Pending => Loadable::Pending,
            Loadable::Failed(e) => Loadable::Failed(e),
        }
    }

    /// Collapse into a `Result`, reporting a pending value as `NotReady { node }`.
    pub fn into_result(self, node: &'static str) -> Result<T> {
        match self {
            Loadable::Ready(v) => Ok(v),
            Loadable::Pending => Err(StateError::NotReady { node }),
            Loadable::Failed(e) => Err(e),
        }
    }
}

/// Early exit from a computation. `?` converts errors into `Failed`.
#[derive(Clone, Debug, PartialEq)]
pub enum Suspend {
    Pending,
    Failed(StateError),
}

impl From<StateError> for Suspend {
    fn from(e: StateError) -> Self {
        Suspend::Failed(e)
    }
}

impl From<tabview_core::TabError> for Suspend {
    fn from(e: tabview_core::TabError) -> Self {
        Suspend::Failed(e.into())
    }
}

/// Handle to a root slot holding a `T`.
pub struct Root<T> {
    id: usize,
    graph: u64,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Root<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Root<T> {}

impl<T> Root<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for Root<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Root({})", self.name)
    }
}

/// Handle to a derived node parameterized by `P` and producing `T`.
pub struct Family<P, T> {
    id: usize,
    graph: u64,
    name: &'static str,
    _marker: PhantomData<fn(&P) -> T>,
}

impl<P, T> Clone for Family<P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, T> Copy for Family<P, T> {}

impl<P, T> Family<P, T> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<P, T> fmt::Debug for Family<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Family({})", self.name)
    }
}

/// A derived node without a parameter.
pub type Selector<T> = Family<(), T>;

type ComputeFn<P, T> = Box<dyn Fn(&mut Reader<'_>, &P) -> std::result::Result<T, Suspend>>;

/// (root id, stamp observed)
type Dep = (usize, u64);

struct RootSlot {
    value: Option<Rc<dyn Any>>,
    stamp: u64,
}

struct Memo<T> {
    result: Loadable<Rc<T>>,
    deps: Vec<Dep>,
}

struct FamilyMemo<P, T> {
    entries: HashMap<P, Memo<T>>,
    in_flight: HashSet<P>,
}

struct FamilySlot {
    name: &'static str,
    /// `Rc<ComputeFn<P, T>>`, erased.
    compute: Rc<dyn Any>,
    /// `FamilyMemo<P, T>`, erased.
    memo: RefCell<Box<dyn Any>>,
    /// `evict_readers::<P, T>`: drops entries that read a root.
    evict: fn(&mut dyn Any, usize),
}

impl FamilySlot {
    fn with_memo<P, T>(&self, f: impl FnOnce(&mut FamilyMemo<P, T>))
    where
        P: 'static,
        T: 'static,
    {
        let mut memo = self.memo.borrow_mut();
        if let Some(memo) = memo.downcast_mut::<FamilyMemo<P, T>>() {
            f(memo);
        }
    }
}

fn evict_readers<P: 'static, T: 'static>(memo: &mut dyn Any, root: usize) {
    if let Some(memo) = memo.downcast_mut::<FamilyMemo<P, T>>() {
        memo.entries
            .retain(|_, entry| !entry.deps.iter().any(|&(id, _)| id == root));
    }
}

/// Marks `param` as computing; unmarks it on drop, including during a panic.
struct InFlight<'a, P: Eq + Hash + 'static, T: 'static> {
    slot: &'a FamilySlot,
    param: &'a P,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, P: Eq + Hash + Clone + 'static, T: 'static> InFlight<'a, P, T> {
    fn enter(slot: &'a FamilySlot, param: &'a P) -> Self {
        slot.with_memo::<P, T>(|memo| {
            memo.in_flight.insert(param.clone());
        });
        Self {
            slot,
            param,
            _marker: PhantomData,
        }
    }
}

impl<P: Eq + Hash + 'static, T: 'static> Drop for InFlight<'_, P, T> {
    fn drop(&mut self) {
        self.slot.with_memo::<P, T>(|memo| {
            memo.in_flight.remove(self.param);
        });
    }
}

/// Read access handed to a computation; records what it reads.
pub struct Reader<'g> {
    graph: &'g Graph,
    deps: Vec<Dep>,
}

impl Reader<'_> {
    /// Read a root, suspending if it has not been written yet.
    pub fn root<T: 'static>(&mut self, root: &Root<T>) -> std::result::Result<Rc<T>, Suspend> {
        let (value, stamp) = self.graph.read_root(root)?;
        self.deps.push((root.id, stamp));
        value.ok_or(Suspend::Pending)
    }

    /// Read another derived node.
    pub fn get<P, T>(
        &mut self,
        family: &Family<P, T>,
        param: &P,
    ) -> std::result::Result<Rc<T>, Suspend>
    where
        P: Eq + Hash + Clone + fmt::Debug + 'static,
        T: 'static,
    {
        let (result, deps) = self.graph.evaluate(family, param);
        self.deps.extend(deps);
        match result {
            Loadable::Ready(v) => Ok(v),
            Loadable::Pending => Err(Suspend::Pending),
            Loadable::Failed(e) => Err(Suspend::Failed(e)),
        }
    }
}

pub struct Graph {
    id: u64,
    revision: u64,
    roots: Vec<RootSlot>,
    families: Vec<FamilySlot>,
    computations: Cell<u64>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            revision: 0,
            roots: Vec::new(),
            families: Vec::new(),
            computations: Cell::new(0),
        }
    }

    /// Register a root slot. It reads as pending until first written.
    pub fn root<T: 'static>(&mut self, name: &'static str) -> Root<T> {
        self.roots.push(RootSlot {
            value: None,
            stamp: 0,
        });
        Root {
            id: self.roots.len() - 1,
            graph: self.id,
            name,
            _marker: PhantomData,
        }
    }

    /// Register a parameterized derived node.
    pub fn family<P, T, F>(&mut self, name: &'static str, compute: F) -> Family<P, T>
    where
        P: Eq + Hash + Clone + fmt::Debug + 'static,
        T: 'static,
        F: Fn(&mut Reader<'_>, &P) -> std::result::Result<T, Suspend> + 'static,
    {
        let compute: Rc<ComputeFn<P, T>> = Rc::new(Box::new(compute));
        let memo: FamilyMemo<P, T> = FamilyMemo {
            entries: HashMap::new(),
            in_flight: HashSet::new(),
        };
        self.families.push(FamilySlot {
            name,
            compute,
            memo: RefCell::new(Box::new(memo)),
            evict: evict_readers::<P, T>,
        });
        Family {
            id: self.families.len() - 1,
            graph: self.id,
            name,
            _marker: PhantomData,
        }
    }

    /// Register a derived node without a parameter.
    pub fn selector<T, F>(&mut self, name: &'static str, compute: F) -> Selector<T>
    where
        T: 'static,
        F: Fn(&mut Reader<'_>) -> std::result::Result<T, Suspend> + 'static,
    {
        self.family(name, move |reader, _: &()| compute(reader))
    }

    /// Write a root. Every node that read it recomputes on its next read.
    pub fn set<T: 'static>(&mut self, root: &Root<T>, value: T) -> Result<()> {
        let revision = self.revision + 1;
        let slot = self.root_slot_mut(root)?;
        slot.value = Some(Rc::new(value));
        slot.stamp = revision;
        self.revision = revision;
        self.evict_readers(root.id);
        debug!(root = root.name, revision, "root written");
        Ok(())
    }

    /// Return a root to the pending state.
    pub fn reset<T: 'static>(&mut self, root: &Root<T>) -> Result<()> {
        let revision = self.revision + 1;
        let slot = self.root_slot_mut(root)?;
        slot.value = None;
        slot.stamp = revision;
        self.revision = revision;
        self.evict_readers(root.id);
        debug!(root = root.name, revision, "root reset");
        Ok(())
    }

    /// Current value of a root.
    pub fn peek<T: 'static>(&self, root: &Root<T>) -> Loadable<Rc<T>> {
        match self.read_root(root) {
            Ok((Some(v), _)) => Loadable::Ready(v),
            Ok((None, _)) => Loadable::Pending,
            Err(e) => Loadable::Failed(e),
        }
    }

    /// Observe a derived node for `param`, computing it if needed.
    pub fn get<P, T>(&self, family: &Family<P, T>, param: &P) -> Loadable<Rc<T>>
    where
        P: Eq + Hash + Clone + fmt::Debug + 'static,
        T: 'static,
    {
        self.evaluate(family, param).0
    }

    /// Observe a parameterless derived node.
    pub fn read<T: 'static>(&self, selector: &Selector<T>) -> Loadable<Rc<T>> {
        self.get(selector, &())
    }

    /// Bumped by every root write or reset. Collaborators waiting on a pending
    /// node can re-read once this moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of derived computations run so far.
    pub fn computations(&self) -> u64 {
        self.computations.get()
    }

    fn root_slot_mut<T>(&mut self, root: &Root<T>) -> Result<&mut RootSlot> {
        if root.graph != self.id {
            return Err(StateError::ForeignHandle { node: root.name });
        }
        self.roots
            .get_mut(root.id)
            .ok_or(StateError::ForeignHandle { node: root.name })
    }

    fn read_root<T: 'static>(&self, root: &Root<T>) -> Result<(Option<Rc<T>>, u64)> {
        let foreign = StateError::ForeignHandle { node: root.name };
        if root.graph != self.id {
            return Err(foreign);
        }
        let slot = self.roots.get(root.id).ok_or(foreign.clone())?;
        let value = match &slot.value {
            Some(v) => Some(v.clone().downcast::<T>().map_err(|_| foreign)?),
            None => None,
        };
        Ok((value, slot.stamp))
    }

    fn evict_readers(&mut self, root: usize) {
        for slot in &mut self.families {
            (slot.evict)(&mut **slot.memo.get_mut(), root);
        }
    }

    fn is_current(&self, deps: &[Dep]) -> bool {
        deps.iter()
            .all(|&(id, stamp)| self.roots.get(id).is_some_and(|r| r.stamp == stamp))
    }

    fn evaluate<P, T>(&self, family: &Family<P, T>, param: &P) -> (Loadable<Rc<T>>, Vec<Dep>)
    where
        P: Eq + Hash + Clone + fmt::Debug + 'static,
        T: 'static,
    {
        let foreign = || {
            (
                Loadable::Failed(StateError::ForeignHandle { node: family.name }),
                Vec::new(),
            )
        };
        if family.graph != self.id {
            return foreign();
        }
        let Some(slot) = self.families.get(family.id) else {
            return foreign();
        };

        {
            let memo = slot.memo.borrow();
            let Some(memo) = memo.downcast_ref::<FamilyMemo<P, T>>() else {
                return foreign();
            };
            if let Some(entry) = memo.entries.get(param)
                && self.is_current(&entry.deps)
            {
                trace!(node = slot.name, ?param, "memo hit");
                return (entry.result.clone(), entry.deps.clone());
            }
            if memo.in_flight.contains(param) {
                return (
                    Loadable::Failed(StateError::Cycle { node: slot.name }),
                    Vec::new(),
                );
            }
        }

        let Ok(compute) = slot.compute.clone().downcast::<ComputeFn<P, T>>() else {
            return foreign();
        };

        let guard = InFlight::<P, T>::enter(slot, param);

        let mut reader = Reader {
            graph: self,
            deps: Vec::new(),
        };
        let outcome = compute(&mut reader, param);
        drop(guard);
        let mut deps = reader.deps;
        deps.sort_unstable();
        deps.dedup();

        self.computations.set(self.computations.get() + 1);

        let result = match outcome {
            Ok(value) => Loadable::Ready(Rc::new(value)),
            Err(Suspend::Pending) => Loadable::Pending,
            Err(Suspend::Failed(e)) => Loadable::Failed(e),
        };
        match &result {
            Loadable::Ready(_) => debug!(node = slot.name, ?param, "recomputed"),
            Loadable::Pending => debug!(node = slot.name, ?param, "pending"),
            Loadable::Failed(e) => debug!(node = slot.name, ?param, error = %e, "failed"),
        }

        slot.with_memo::<P, T>(|memo| {
            memo.entries.insert(
                param.clone(),
                Memo {
                    result: result.clone(),
                    deps: deps.clone(),
                },
            );
        });

        (result, deps)
    }
}
