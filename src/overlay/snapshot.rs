use std::sync::{Arc, Mutex};

/// Single-writer handoff of an immutable value between threads
///
/// Readers get an `Arc` to a complete value; a concurrent `store` never
/// tears what a reader already holds.
#[derive(Debug)]
pub struct SnapshotCell<T: ?Sized> {
    current: Mutex<Arc<T>>,
}

impl<T: ?Sized> SnapshotCell<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self {
            current: Mutex::new(value),
        }
    }

    pub fn load(&self) -> Arc<T> {
        Arc::clone(&self.current.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn store(&self, value: Arc<T>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(Arc::new(T::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_reader_keeps_old_snapshot() {
        let cell: SnapshotCell<[u32]> = SnapshotCell::new(Arc::from(vec![1, 2, 3]));
        let before = cell.load();
        cell.store(Arc::from(vec![4]));
        assert_eq!(&*before, &[1, 2, 3]);
        assert_eq!(&*cell.load(), &[4]);
    }

    #[test]
    fn test_no_torn_reads() {
        let cell = Arc::new(SnapshotCell::new(Arc::new((0u64, 0u64))));
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 1..=10_000u64 {
                    cell.store(Arc::new((i, i * 2)));
                }
            })
        };
        for _ in 0..10_000 {
            let v = cell.load();
            assert_eq!(v.1, v.0 * 2);
        }
        writer.join().unwrap();
    }
}
