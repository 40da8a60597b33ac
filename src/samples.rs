//! Fixed-capacity circular sample storage.
//!
//! A ring always holds exactly `capacity` samples. Slots that were never
//! written read as zero, so the visible series has constant length from the
//! moment a graph is built. The cursor points at the next slot to overwrite,
//! which is also the oldest retained sample.
//!
//! Rings are shared between an ingestion thread (writer) and a render thread
//! (reader). [`SyncStrategy`] selects how that sharing is synchronized.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use thiserror::Error;

/// How a ring is shared between its writer and its reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// Lock-free slots. Every sample is read whole, but a frame rendered
    /// while appends are in flight may mix samples from before and after
    /// those appends.
    #[default]
    Relaxed,
    /// A mutex around the whole ring. Each frame sees a consistent snapshot
    /// at the cost of taking the lock on every append and every render.
    Locked,
}

/// Index passed to [`SampleRing::set`] was outside the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sample index {index} out of range for capacity {capacity}")]
pub struct OutOfRange {
    /// Requested index.
    pub index: usize,
    /// Ring capacity.
    pub capacity: usize,
}

/// Circular buffer of `f32` samples.
#[derive(Debug)]
pub struct SampleRing {
    capacity: usize,
    storage: Storage,
}

#[derive(Debug)]
enum Storage {
    Relaxed {
        slots: Box<[AtomicU32]>,
        cursor: AtomicUsize,
    },
    Locked(Mutex<LockedRing>),
}

#[derive(Debug)]
struct LockedRing {
    values: Vec<f32>,
    cursor: usize,
}

impl SampleRing {
    /// Create a zero-filled ring. A capacity of zero is raised to one.
    pub fn new(capacity: usize, sync: SyncStrategy) -> Self {
        let capacity = capacity.max(1);
        let storage = match sync {
            SyncStrategy::Relaxed => Storage::Relaxed {
                slots: (0..capacity)
                    .map(|_| AtomicU32::new(0.0_f32.to_bits()))
                    .collect(),
                cursor: AtomicUsize::new(0),
            },
            SyncStrategy::Locked => Storage::Locked(Mutex::new(LockedRing {
                values: vec![0.0; capacity],
                cursor: 0,
            })),
        };
        Self { capacity, storage }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The synchronization strategy this ring was built with.
    pub fn sync(&self) -> SyncStrategy {
        match self.storage {
            Storage::Relaxed { .. } => SyncStrategy::Relaxed,
            Storage::Locked(_) => SyncStrategy::Locked,
        }
    }

    /// Index of the next slot to overwrite.
    pub fn cursor(&self) -> usize {
        match &self.storage {
            Storage::Relaxed { cursor, .. } => cursor.load(Ordering::Acquire),
            Storage::Locked(ring) => ring.lock().expect("sample ring lock").cursor,
        }
    }

    /// Read the sample stored at an absolute slot index.
    pub fn get(&self, index: usize) -> Option<f32> {
        if index >= self.capacity {
            return None;
        }
        match &self.storage {
            Storage::Relaxed { slots, .. } => {
                Some(f32::from_bits(slots[index].load(Ordering::Relaxed)))
            }
            Storage::Locked(ring) => Some(ring.lock().expect("sample ring lock").values[index]),
        }
    }

    /// Overwrite the sample at an absolute slot index. The cursor is not moved.
    pub fn set(&self, index: usize, value: f32) -> Result<(), OutOfRange> {
        if index >= self.capacity {
            return Err(OutOfRange {
                index,
                capacity: self.capacity,
            });
        }
        match &self.storage {
            Storage::Relaxed { slots, .. } => {
                slots[index].store(value.to_bits(), Ordering::Relaxed);
            }
            Storage::Locked(ring) => {
                ring.lock().expect("sample ring lock").values[index] = value;
            }
        }
        Ok(())
    }

    /// Overwrite the oldest sample and advance the cursor.
    ///
    /// Returns the slot that was written.
    pub fn append(&self, value: f32) -> usize {
        let capacity = self.capacity;
        match &self.storage {
            Storage::Relaxed { slots, cursor } => {
                let slot = match cursor.fetch_update(Ordering::AcqRel, Ordering::Acquire, |pos| {
                    Some((pos + 1) % capacity)
                }) {
                    Ok(pos) | Err(pos) => pos,
                };
                slots[slot].store(value.to_bits(), Ordering::Release);
                slot
            }
            Storage::Locked(ring) => {
                let mut ring = ring.lock().expect("sample ring lock");
                let slot = ring.cursor;
                ring.values[slot] = value;
                ring.cursor = (slot + 1) % capacity;
                slot
            }
        }
    }

    /// Visit every sample from oldest to newest.
    ///
    /// The callback receives the chronological position (0 = oldest) and the
    /// sample value. Slots `[cursor, capacity)` come first, then `[0, cursor)`.
    pub fn for_each_chronological(&self, mut f: impl FnMut(usize, f32)) {
        match &self.storage {
            Storage::Relaxed { slots, cursor } => {
                let pos = cursor.load(Ordering::Acquire);
                let (newer, older) = slots.split_at(pos);
                for (out, slot) in older.iter().chain(newer).enumerate() {
                    f(out, f32::from_bits(slot.load(Ordering::Acquire)));
                }
            }
            Storage::Locked(ring) => {
                let ring = ring.lock().expect("sample ring lock");
                let (newer, older) = ring.values.split_at(ring.cursor);
                for (out, value) in older.iter().chain(newer).enumerate() {
                    f(out, *value);
                }
            }
        }
    }

    /// Copy the samples out from oldest to newest.
    pub fn chronological(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.capacity);
        self.for_each_chronological(|_, value| out.push(value));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both() -> [SyncStrategy; 2] {
        [SyncStrategy::Relaxed, SyncStrategy::Locked]
    }

    #[test]
    fn new_ring_is_zero_filled() {
        for sync in both() {
            let ring = SampleRing::new(6, sync);
            assert_eq!(ring.capacity(), 6);
            assert_eq!(ring.cursor(), 0);
            assert_eq!(ring.chronological(), vec![0.0; 6]);
            assert_eq!(ring.sync(), sync);
        }
    }

    #[test]
    fn append_overwrites_then_advances() {
        for sync in both() {
            let ring = SampleRing::new(3, sync);
            for step in 0..7 {
                let before = ring.cursor();
                let value = step as f32 * 1.5;
                assert_eq!(ring.append(value), before);
                assert_eq!(ring.get(before), Some(value));
                assert_eq!(ring.cursor(), (before + 1) % 3);
            }
        }
    }

    #[test]
    fn chronological_after_exactly_capacity_appends() {
        for sync in both() {
            let ring = SampleRing::new(4, sync);
            for value in [1.0, 2.0, 3.0, 4.0] {
                ring.append(value);
            }
            assert_eq!(ring.chronological(), vec![1.0, 2.0, 3.0, 4.0]);
        }
    }

    #[test]
    fn chronological_drops_oldest_after_wrap() {
        for sync in both() {
            let ring = SampleRing::new(4, sync);
            for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
                ring.append(value);
            }
            assert_eq!(ring.chronological(), vec![2.0, 3.0, 4.0, 5.0]);
        }
    }

    #[test]
    fn partial_fill_keeps_zero_prefix() {
        let ring = SampleRing::new(5, SyncStrategy::Relaxed);
        ring.append(9.0);
        ring.append(8.0);
        assert_eq!(ring.chronological(), vec![0.0, 0.0, 0.0, 9.0, 8.0]);
    }

    #[test]
    fn set_leaves_cursor_alone() {
        for sync in both() {
            let ring = SampleRing::new(4, sync);
            ring.append(1.0);
            ring.set(3, -2.5).unwrap();
            assert_eq!(ring.cursor(), 1);
            assert_eq!(ring.get(3), Some(-2.5));
            assert_eq!(
                ring.set(4, 0.0),
                Err(OutOfRange {
                    index: 4,
                    capacity: 4
                })
            );
        }
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let ring = SampleRing::new(0, SyncStrategy::Locked);
        assert_eq!(ring.capacity(), 1);
        ring.append(3.0);
        ring.append(4.0);
        assert_eq!(ring.chronological(), vec![4.0]);
        assert_eq!(ring.cursor(), 0);
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        use std::sync::Arc;

        for sync in both() {
            let ring = Arc::new(SampleRing::new(64, sync));
            let writers: Vec<_> = (0..4)
                .map(|_| {
                    let ring = Arc::clone(&ring);
                    std::thread::spawn(move || {
                        for _ in 0..16 {
                            ring.append(1.0);
                        }
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }
            assert_eq!(ring.cursor(), 0);
            assert!(ring.chronological().iter().all(|value| *value == 1.0));
        }
    }
}
