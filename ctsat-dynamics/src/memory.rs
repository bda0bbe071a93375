use ndarray::Array1;

/// Fixed-capacity ring buffer of failed discrete assignments, stored as
/// plus/minus-one spin vectors. Oldest entries are overwritten on overflow.
#[derive(Debug, Clone)]
pub struct OrtantMemory {
    slots: Vec<Array1<f64>>,
    capacity: usize,
    cursor: usize,
}

impl OrtantMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    pub fn push(&mut self, ortant: Array1<f64>) {
        if self.slots.len() < self.capacity {
            self.slots.push(ortant);
        } else {
            self.slots[self.cursor] = ortant;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Array1<f64>> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
