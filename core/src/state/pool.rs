//! Free list of reusable values

/// Fixed-capacity pool of pre-built values.
///
/// Used on the single simulation thread only. Released values keep their
/// heap allocations, so a save into a recycled snapshot reuses its vectors.
pub struct Pool<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: Default> Pool<T> {
    /// Create a pool holding `capacity` default values
    pub fn new(capacity: usize) -> Self {
        Self {
            items: (0..capacity).map(|_| T::default()).collect(),
            capacity,
        }
    }

    /// Take a value from the pool.
    ///
    /// If the pool is empty, builds a new one (should be rare in steady state).
    pub fn acquire(&mut self) -> T {
        self.items.pop().unwrap_or_else(|| {
            log::warn!(
                "Pool<{}> exhausted, allocating new value",
                std::any::type_name::<T>()
            );
            T::default()
        })
    }
}

impl<T> Pool<T> {
    /// Return a value. Values beyond capacity are dropped.
    pub fn release(&mut self, item: T) {
        if self.items.len() < self.capacity {
            self.items.push(item);
        }
    }

    /// Number of idle values
    pub fn available(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every idle value, returning how many were dropped
    pub fn drain(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }
}
