use std::fmt;

/// Stable reference to a registry entry.
///
/// The generation makes handles to removed entries stale, even after their
/// slot has been reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// What an entry wants after its update.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Step {
    Continue,
    Destroy,
}

/// Changes applied by one [`Registry::commit`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CommitReport {
    pub spawned: usize,
    pub despawned: usize,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
    /// Committed: visible to iteration.
    live: bool,
    /// Despawned, removed at the next commit.
    doomed: bool,
}

impl<T> Slot<T> {
    fn is_reachable(&self) -> bool {
        self.value.is_some() && !self.doomed
    }

    fn is_active(&self) -> bool {
        self.live && self.is_reachable()
    }
}

/// Generational arena with deferred insertion and removal.
///
/// [`spawn`](Self::spawn) hands out a handle right away and the entry can be
/// looked up through it, but iteration only sees it after the next
/// [`commit`](Self::commit). [`despawn`](Self::despawn) hides the entry
/// immediately and frees its slot at the next commit. Iteration is in slot
/// order.
#[derive(Debug)]
pub struct Registry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    pending_spawn: Vec<u32>,
    pending_despawn: Vec<u32>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            pending_spawn: Vec::new(),
            pending_despawn: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `value` for insertion and returns its handle.
    pub fn spawn(&mut self, value: T) -> Handle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                    live: false,
                    doomed: false,
                });
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.value = Some(value);
        slot.live = false;
        slot.doomed = false;
        self.pending_spawn.push(index);

        Handle {
            index,
            generation: slot.generation,
        }
    }

    /// Marks the entry for removal. Returns `false` for stale handles and
    /// entries already despawned.
    pub fn despawn(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        slot.doomed = true;
        self.pending_despawn.push(handle.index);
        true
    }

    /// Applies queued spawns and despawns.
    pub fn commit(&mut self) -> CommitReport {
        let mut report = CommitReport::default();

        for index in self.pending_spawn.drain(..) {
            let slot = &mut self.slots[index as usize];
            if !slot.doomed && slot.value.is_some() {
                slot.live = true;
                report.spawned += 1;
            }
        }

        for index in self.pending_despawn.drain(..) {
            let slot = &mut self.slots[index as usize];
            if slot.value.take().is_none() {
                continue;
            }
            log::info!("despawned #{index}v{}", slot.generation);
            slot.generation = slot.generation.wrapping_add(1);
            slot.live = false;
            slot.doomed = false;
            self.free.push(index);
            report.despawned += 1;
        }

        if report != CommitReport::default() {
            log::debug!("registry commit: +{} -{}", report.spawned, report.despawned);
        }
        report
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.is_reachable())
    }

    fn slot_mut(&mut self, handle: Handle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.is_reachable())
    }

    /// The entry behind `handle`, pending or committed, unless despawned.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slot(handle).and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slot_mut(handle).and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.slot(handle).is_some()
    }

    /// Number of committed, non-despawned entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Committed, non-despawned entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            if !slot.is_active() {
                return None;
            }
            let handle = Handle {
                index: index as u32,
                generation: slot.generation,
            };
            slot.value.as_ref().map(|value| (handle, value))
        })
    }

    /// Handles of the entries [`iter`](Self::iter) would visit.
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Runs `update` on every committed entry in slot order.
    ///
    /// The entry being updated is moved out of the registry for the call, so
    /// `update` can read every other entry through the shared reference.
    /// Entries returning [`Step::Destroy`] are despawned. Returns how many were.
    pub fn update_each<F>(&mut self, mut update: F) -> usize
    where
        F: FnMut(Handle, &mut T, &Self) -> Step,
    {
        let mut destroyed = 0;
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            if !slot.is_active() {
                continue;
            }
            let handle = Handle {
                index: index as u32,
                generation: slot.generation,
            };
            let Some(mut value) = slot.value.take() else { continue };

            let step = update(handle, &mut value, self);

            self.slots[index].value = Some(value);
            if step == Step::Destroy && self.despawn(handle) {
                destroyed += 1;
            }
        }
        destroyed
    }
}
