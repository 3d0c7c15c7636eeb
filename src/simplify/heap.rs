//! Array-backed min-heap over integer handles with decrease/increase-key
//!
//! Each handle remembers the slot it currently occupies, so changing the
//! priority of any live element relocates exactly that element in O(log n).
//! Handles are plain `usize` ids (0..capacity); ties between equal values are
//! broken by the smaller handle so the pop order is deterministic.

const NOT_IN_HEAP: usize = usize::MAX;

pub struct IndexedMinHeap {
    /// slots[0..len] hold handles in heap order
    slots: Vec<usize>,
    /// values[handle] is the current priority of that handle
    values: Vec<f64>,
    /// slot_of[handle] is its position in `slots`, or NOT_IN_HEAP
    slot_of: Vec<usize>,
}

impl IndexedMinHeap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            values: vec![f64::INFINITY; capacity],
            slot_of: vec![NOT_IN_HEAP; capacity],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn contains(&self, handle: usize) -> bool {
        handle < self.slot_of.len() && self.slot_of[handle] != NOT_IN_HEAP
    }

    /// Insert `handle` with `value`, or change its value if already present
    pub fn push(&mut self, handle: usize, value: f64) {
        if self.contains(handle) {
            self.update(handle, value);
            return;
        }
        if handle >= self.values.len() {
            // Grow if needed
            let new_len = (handle + 1).max(self.values.len() * 2);
            self.values.resize(new_len, f64::INFINITY);
            self.slot_of.resize(new_len, NOT_IN_HEAP);
        }
        let slot = self.slots.len();
        self.slots.push(handle);
        self.values[handle] = value;
        self.slot_of[handle] = slot;
        self.float_up(slot);
    }

    /// Change the priority of a live handle; unknown handles are ignored
    pub fn update(&mut self, handle: usize, value: f64) {
        if !self.contains(handle) {
            return;
        }
        let old = self.values[handle];
        self.values[handle] = value;
        let slot = self.slot_of[handle];
        if value < old {
            self.float_up(slot);
        } else {
            self.float_down(slot);
        }
    }

    pub fn peek_id(&self) -> Option<usize> {
        self.slots.first().copied()
    }

    pub fn peek_value(&self) -> Option<f64> {
        self.peek_id().map(|h| self.values[h])
    }

    pub fn value_of(&self, handle: usize) -> Option<f64> {
        if self.contains(handle) {
            Some(self.values[handle])
        } else {
            None
        }
    }

    /// Remove and return the handle with the smallest value
    pub fn poll(&mut self) -> Option<usize> {
        let h_min = *self.slots.first()?;
        let last = self.slots.pop()?;
        self.slot_of[h_min] = NOT_IN_HEAP;
        if !self.slots.is_empty() {
            self.slots[0] = last;
            self.slot_of[last] = 0;
            self.float_down(0);
        }
        Some(h_min)
    }

    pub fn clear(&mut self) {
        for &h in &self.slots {
            self.slot_of[h] = NOT_IN_HEAP;
        }
        self.slots.clear();
    }

    /// true iff handle `a` sorts strictly before handle `b`
    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        match self.values[a].total_cmp(&self.values[b]) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => a < b,
        }
    }

    fn float_up(&mut self, mut curr: usize) {
        let h_curr = self.slots[curr];
        while curr > 0 {
            let parent = (curr - 1) >> 1;
            let h_parent = self.slots[parent];
            if !self.less(h_curr, h_parent) {
                break;
            }
            self.slots[curr] = h_parent;
            self.slot_of[h_parent] = curr;
            curr = parent;
        }
        self.slots[curr] = h_curr;
        self.slot_of[h_curr] = curr;
    }

    fn float_down(&mut self, mut curr: usize) {
        let size = self.slots.len();
        let h_curr = self.slots[curr];
        loop {
            let mut child = (curr << 1) + 1;
            if child >= size {
                break;
            }
            if child + 1 < size && self.less(self.slots[child + 1], self.slots[child]) {
                child += 1;
            }
            let h_child = self.slots[child];
            if !self.less(h_child, h_curr) {
                break;
            }
            self.slots[curr] = h_child;
            self.slot_of[h_child] = curr;
            curr = child;
        }
        self.slots[curr] = h_curr;
        self.slot_of[h_curr] = curr;
    }
}
