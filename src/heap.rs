//! Storage for every instance a program creates.
//!
//! Instances point at each other (and at themselves) through [`InstanceId`]
//! handles rather than owning pointers, so cycles such as `this.me = this`
//! hold nothing alive on their own. A mark-sweep pass over the heap frees
//! whatever the interpreter's roots can no longer reach.

use crate::class::Instance;
use crate::value::Value;

/// Live instance count that triggers the first automatic collection.
const INITIAL_THRESHOLD: usize = 1024;

/// Handle to an instance stored in a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(usize);

#[derive(Debug, Clone, Default)]
pub struct GcStats {
    pub collections: usize,
    pub instances_freed: usize,
}

#[derive(Debug)]
pub struct Heap {
    slots: Vec<Option<Instance>>,
    free: Vec<usize>,
    live: usize,
    threshold: usize,
    stats: GcStats,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            threshold: INITIAL_THRESHOLD,
            stats: GcStats::default(),
        }
    }

    pub fn allocate(&mut self, instance: Instance) -> InstanceId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(instance);
                InstanceId(index)
            }
            None => {
                self.slots.push(Some(instance));
                InstanceId(self.slots.len() - 1)
            }
        }
    }

    /// # Panics
    ///
    /// If `id` was freed. Collections only free unreachable instances, so a
    /// handle the program can still name is always live.
    pub fn get(&self, id: InstanceId) -> &Instance {
        match &self.slots[id.0] {
            Some(instance) => instance,
            None => panic!("instance #{} used after it was collected", id.0),
        }
    }

    /// # Panics
    ///
    /// Same as [`Heap::get`].
    pub fn get_mut(&mut self, id: InstanceId) -> &mut Instance {
        match &mut self.slots[id.0] {
            Some(instance) => instance,
            None => panic!("instance #{} used after it was collected", id.0),
        }
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    pub fn should_collect(&self) -> bool {
        self.live >= self.threshold
    }

    /// Frees every instance not reachable from `roots`, following fields and
    /// bound-method receivers. Returns how many instances were freed.
    pub fn collect(&mut self, roots: &[Value]) -> usize {
        let mut marked = vec![false; self.slots.len()];
        let mut pending: Vec<InstanceId> =
            roots.iter().filter_map(Value::referenced_instance).collect();

        while let Some(id) = pending.pop() {
            if marked[id.0] {
                continue;
            }
            marked[id.0] = true;
            pending.extend(self.get(id).fields().filter_map(Value::referenced_instance));
        }

        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_some() && !marked[index] {
                *slot = None;
                self.free.push(index);
                freed += 1;
            }
        }

        self.live -= freed;
        self.stats.collections += 1;
        self.stats.instances_freed += freed;
        self.threshold = (self.live * 2).max(INITIAL_THRESHOLD);
        freed
    }
}
