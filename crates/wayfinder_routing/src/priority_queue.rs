/// Binary min-heap keyed by a floating point priority.
///
/// There is no decrease-key: callers push the same item again with a better
/// priority and discard the stale entry when it is popped.
pub struct PriorityQueue<T> {
    heap: Vec<(T, f64)>,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn push(&mut self, item: T, priority: f64) {
        self.heap.push((item, priority));
        self.sift_up(self.heap.len() - 1);
    }

    pub fn peek(&self) -> Option<&(T, f64)> {
        self.heap.first()
    }

    /// Removes the entry with the lowest priority, `None` when empty.
    pub fn pop(&mut self) -> Option<(T, f64)> {
        if self.heap.is_empty() {
            return None;
        }

        // The last element becomes the root
        let root = self.heap.swap_remove(0);

        if !self.heap.is_empty() {
            self.sift_down(0);
        }

        Some(root)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    fn sift_up(&mut self, element_index: usize) {
        let mut index = element_index;

        while index > 0 {
            let parent_index = (index - 1) >> 1;
            if self.heap[index].1 >= self.heap[parent_index].1 {
                break;
            }

            self.heap.swap(index, parent_index);
            index = parent_index;
        }
    }

    fn sift_down(&mut self, element_index: usize) {
        let size = self.heap.len();
        let mut index = element_index;

        loop {
            let left_child_index = (index << 1) + 1;
            let right_child_index = left_child_index + 1;

            if left_child_index >= size {
                break;
            }

            let mut child_index = left_child_index;
            if right_child_index < size
                && self.heap[right_child_index].1 < self.heap[left_child_index].1
            {
                child_index = right_child_index;
            }

            if self.heap[index].1 <= self.heap[child_index].1 {
                break;
            }

            self.heap.swap(index, child_index);
            index = child_index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pop() {
        let mut queue = PriorityQueue::<usize>::new();
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_size() {
        let mut queue = PriorityQueue::new();
        queue.push(1, 5.0);
        assert_eq!(queue.len(), 1);
        queue.push(2, 5.0);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_push_and_peek() {
        let mut queue = PriorityQueue::new();
        queue.push(1, 5.0);
        assert_eq!(queue.peek(), Some(&(1, 5.0)));
        queue.push(2, 3.0);
        assert_eq!(queue.peek(), Some(&(2, 3.0)));
        queue.push(3, 4.0);
        assert_eq!(queue.peek(), Some(&(2, 3.0)));
    }

    #[test]
    fn test_pop() {
        let mut queue = PriorityQueue::new();
        queue.push(1, 5.0);
        queue.push(2, 3.0);
        queue.push(3, 4.0);

        assert_eq!(queue.pop(), Some((2, 3.0)));
        assert_eq!(queue.pop(), Some((3, 4.0)));
        assert_eq!(queue.pop(), Some((1, 5.0)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn duplicate_items_are_kept() {
        let mut queue = PriorityQueue::new();
        queue.push(7, 10.0);
        queue.push(7, 2.0);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some((7, 2.0)));
        assert_eq!(queue.pop(), Some((7, 10.0)));
    }

    #[test]
    fn pops_in_non_decreasing_order() {
        let mut queue = PriorityQueue::new();

        // Deterministic pseudo random sequence
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for i in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            queue.push(i, (seed % 10_000) as f64 / 7.0);

            if i % 7 == 0 {
                queue.pop();
            }
        }

        let mut previous = f64::NEG_INFINITY;
        while let Some((_, priority)) = queue.pop() {
            assert!(priority >= previous, "{priority} < {previous}");
            previous = priority;
        }
    }

    #[test]
    fn test_clear() {
        let mut queue = PriorityQueue::new();
        queue.push(1, 5.0);
        queue.push(2, 3.0);

        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.pop(), None);

        queue.push(1, 5.0);
        assert_eq!(queue.len(), 1);
    }
}
