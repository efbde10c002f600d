use crate::frame::TERMINATOR;

/// Accumulates bytes received from the serial port and hands them out one
/// terminated line at a time.
#[derive(Debug)]
pub struct Buffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl Buffer {
    pub fn new() -> Buffer {
        Buffer {
            data: Vec::with_capacity(32),
            read_pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len() - self.read_pos
    }

    pub fn write(&mut self, bytes: &[u8]) {
        if self.read_pos == self.data.len() {
            self.clear();
        }
        self.data.extend_from_slice(bytes);
    }

    /// Removes the next complete line from the buffer, without its terminator.
    pub fn take_line(&mut self) -> Option<Vec<u8>> {
        let pending = &self.data[self.read_pos..];
        let end = pending.iter().position(|&b| b == TERMINATOR)?;
        let line = pending[..end].to_vec();
        self.read_pos += end + 1;
        Some(line)
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.read_pos = 0;
    }
}
