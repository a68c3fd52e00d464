//! Circular byte buffer

/// Fixed-capacity ring of bytes with independent write and read indices.
///
/// Writing never fails: once the ring is full the oldest byte is silently
/// overwritten. Reading never runs dry either; it walks the stored bytes
/// round and round, which is how a fixed transmit pattern is replayed.
#[derive(Debug, Clone)]
pub struct CircularBuffer<const N: usize> {
    /// Ring storage
    data: [u8; N],
    /// Next slot to write
    write_index: usize,
    /// Next slot to read
    read_index: usize,
    /// Valid bytes, saturating at `N`
    filled: usize,
}

impl<const N: usize> CircularBuffer<N> {
    const NON_EMPTY: () = assert!(N > 0, "circular buffer capacity must be at least 1");

    /// Zero-filled buffer with both indices at 0
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            data: [0; N],
            write_index: 0,
            read_index: 0,
            filled: 0,
        }
    }

    /// Buffer holding `data`, read from index 0
    pub const fn from_array(data: [u8; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            data,
            write_index: 0,
            read_index: 0,
            filled: N,
        }
    }

    pub fn write_index(&self) -> usize {
        self.write_index
    }

    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Store `byte` at the write index and advance it
    pub fn push(&mut self, byte: u8) {
        self.data[self.write_index] = byte;
        self.write_index = (self.write_index + 1) % N;
        if self.filled < N {
            self.filled += 1;
        }
    }

    /// Byte at the read index
    pub fn peek(&self) -> u8 {
        self.data[self.read_index]
    }

    /// Advance the read index by one slot
    pub fn advance(&mut self) {
        self.read_index = (self.read_index + 1) % N;
    }

    /// Byte at the read index; the index advances
    pub fn next_byte(&mut self) -> u8 {
        let byte = self.peek();
        self.advance();
        byte
    }

    /// Raw storage in slot order
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Stored bytes, oldest first
    pub fn ordered(&self) -> heapless::Vec<u8, N> {
        let mut out = heapless::Vec::new();
        let start = if self.filled < N { 0 } else { self.write_index };
        for i in 0..self.filled {
            // `filled <= N`, so the push cannot fail
            let _ = out.push(self.data[(start + i) % N]);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }
}

impl<const N: usize> Default for CircularBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
