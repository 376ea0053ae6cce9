/// Largest integer an `f64` holds exactly. Serials cross a JSON boundary to
/// the engine, so they must stay below it.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Hands out correlation serials for engine requests.
///
/// Values start at 1 and increase by one per call. When the counter would
/// reach [`MAX_SAFE_INTEGER`] it wraps to 0. The allocator has a single
/// owner and is mutated through `&mut self`, so no locking is involved.
#[derive(Debug, Clone)]
pub struct SerialAllocator {
    next: u64,
}

impl SerialAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next serial.
    pub fn next(&mut self) -> u64 {
        let serial = self.next;
        self.next += 1;
        if self.next == MAX_SAFE_INTEGER {
            self.next = 0;
        }
        serial
    }

    /// The value the next call to [`next`](Self::next) will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for SerialAllocator {
    fn default() -> Self {
        Self::new()
    }
}
