use std::cmp::min;
use std::ops::Index;

use crate::utils::MyHash;

struct Entry<T> {
    value: T,
    /// Index of the next cell in the same bucket (0 terminates the chain).
    /// Free cells reuse it to link the free list.
    next: usize,
    occupied: bool,
}

/// Hash-consing table: every distinct value is stored at most once.
///
/// Dropped cells go onto a free list and are reused by later additions.
pub struct Table<T> {
    data: Vec<Entry<T>>,
    capacity: usize,
    size: usize,
    free: usize,

    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table able to hold `2^bits` cells (including the sentry).
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let capacity = 1 << bits;

        // Cell 0 is the sentry, so the first real index is 1.
        let mut data = Vec::with_capacity(min(capacity, 1 << 10));
        data.push(Entry {
            value: T::default(),
            next: 0,
            occupied: false,
        });

        let buckets_bits = min(bits, 16);
        let buckets_size = 1 << buckets_bits;

        Self {
            data,
            capacity,
            size: 0,
            free: 0,
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
        }
    }
}

impl<T> Table<T> {
    /// Get the maximum number of cells.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Get the number of occupied cells.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        debug_assert!(self.data[index].occupied, "Cell {} is free", index);
        &self.data[index].value
    }

    /// Get the index of the next cell in the bucket chain.
    pub fn next(&self, index: usize) -> usize {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next
    }
    pub fn set_next(&mut self, index: usize, next: usize) {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next = next;
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        assert_ne!(index, 0, "Index is 0");
        index < self.data.len() && self.data[index].occupied
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }
    /// Get the index of the first cell in the bucket (0 if the bucket is empty).
    pub fn bucket(&self, bucket_index: usize) -> usize {
        self.buckets[bucket_index]
    }
    pub fn set_bucket(&mut self, bucket_index: usize, index: usize) {
        self.buckets[bucket_index] = index;
    }

    /// Add a new value to the table (without hash-consing) and return its index.
    ///
    /// Free cells are reused before the table grows.
    pub fn add(&mut self, value: T) -> usize {
        let entry = Entry {
            value,
            next: 0,
            occupied: true,
        };
        let index = if self.free != 0 {
            let index = self.free;
            self.free = self.data[index].next;
            self.data[index] = entry;
            index
        } else {
            if self.data.len() >= self.capacity {
                panic!("Storage is full");
            }
            self.data.push(entry);
            self.data.len() - 1
        };
        self.size += 1;
        index
    }

    /// Free the cell at the given index.
    ///
    /// The caller is responsible for unlinking it from its bucket chain first.
    pub fn drop(&mut self, index: usize) {
        assert_ne!(index, 0, "Index is 0");
        assert!(self.data[index].occupied, "Cell {} is already free", index);
        self.data[index].occupied = false;
        self.data[index].next = self.free;
        self.free = index;
        self.size -= 1;
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq,
{
    pub fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Put a value into the table and return its index.
    ///
    /// If an equal value is already stored, its index is returned instead.
    pub fn put(&mut self, value: T) -> usize {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        if index == 0 {
            let i = self.add(value);
            self.buckets[bucket_index] = i;
            return i;
        }

        loop {
            if &value == self.value(index) {
                return index;
            }

            let next = self.next(index);
            if next == 0 {
                let i = self.add(value);
                self.set_next(index, i);
                return i;
            }
            index = next;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
    struct Item(i32);

    impl MyHash for Item {
        fn hash(&self) -> u64 {
            self.0.unsigned_abs() as u64
        }
    }

    #[test]
    fn test_add() {
        let mut table = Table::new(2);
        let index = table.add(Item(42));
        assert_eq!(index, 1);
        assert_eq!(table[index], Item(42));
        assert_eq!(table.next(index), 0);
        assert_eq!(table.size(), 1);
    }

    #[test]
    #[should_panic(expected = "Storage is full")]
    fn test_add_too_much() {
        let mut table = Table::new(2);
        table.add(Item(1));
        table.add(Item(2));
        table.add(Item(3));
        table.add(Item(4));
    }

    #[test]
    fn test_drop_reuses_cell() {
        let mut table = Table::new(2);
        let index1 = table.add(Item(1));
        let index2 = table.add(Item(2));
        let index3 = table.add(Item(3));
        assert_eq!(table.size(), 3);

        table.drop(index2);
        assert!(!table.is_occupied(index2));
        assert!(table.is_occupied(index1));
        assert_eq!(table.size(), 2);

        // The table is at capacity, so only the freed cell can be handed out.
        let index4 = table.add(Item(4));
        assert_eq!(index4, index2);
        assert_eq!(table[index4], Item(4));
        assert_eq!(table[index3], Item(3));
        assert_eq!(table.size(), 3);
    }

    #[test]
    #[should_panic(expected = "already free")]
    fn test_drop_twice() {
        let mut table = Table::new(2);
        let index = table.add(Item(1));
        table.drop(index);
        table.drop(index);
    }

    #[test]
    fn test_put_dedup() {
        let mut table = Table::new(4);
        let i1 = table.put(Item(7));
        let i2 = table.put(Item(7));
        assert_eq!(i1, i2);
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_put_collision_chain() {
        let mut table = Table::new(2);
        let index1 = table.put(Item(5));
        let index2 = table.put(Item(-5));
        assert_ne!(index1, index2);
        assert_eq!(table[index1], Item(5));
        assert_eq!(table[index2], Item(-5));
        assert_eq!(table.next(index1), index2);
        assert_eq!(table.put(Item(-5)), index2);
    }

    #[test]
    fn test_put_after_unlink() {
        let mut table = Table::new(2);
        let index1 = table.put(Item(5));
        let index2 = table.put(Item(-5));

        // Unlink the head of the chain, then drop it.
        let bucket = table.bucket_index(&Item(5));
        assert_eq!(table.bucket(bucket), index1);
        table.set_bucket(bucket, index2);
        table.drop(index1);

        assert_eq!(table.put(Item(-5)), index2);
        let index3 = table.put(Item(5));
        assert_eq!(index3, index1);
        assert_eq!(table.next(index2), index3);
    }
}
