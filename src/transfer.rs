use core::cmp::min;

/// Capacity of the OUT data stage buffer. Longer declared transfers are clamped to this.
pub const WRITE_BUFFER_LEN: usize = 8;

/// Streams a static descriptor that is larger than one transaction to the host.
///
/// The cursor is armed with a blob and a length and then drained by repeated [`read`] calls, one
/// per IN transaction. Once the remaining count reaches zero every further read is empty.
///
/// [`read`]: ReadCursor::read
#[derive(Clone, Debug, Default)]
pub struct ReadCursor {
    data: &'static [u8],
    position: usize,
    remaining: usize,
}

impl ReadCursor {
    /// Creates an empty cursor.
    pub const fn new() -> ReadCursor {
        ReadCursor {
            data: &[],
            position: 0,
            remaining: 0,
        }
    }

    /// Starts streaming `length` bytes of `data` from the beginning. `length` is clamped to the
    /// length of `data`.
    pub fn arm(&mut self, data: &'static [u8], length: usize) {
        self.data = data;
        self.position = 0;
        self.remaining = min(length, data.len());
    }

    /// Returns the next chunk of at most `max_len` bytes and advances the cursor past it.
    pub fn read(&mut self, max_len: usize) -> &'static [u8] {
        let count = min(max_len, self.remaining);
        let data: &'static [u8] = self.data;
        let chunk = &data[self.position..self.position + count];

        self.position += count;
        self.remaining -= count;

        chunk
    }

    /// Number of bytes left to stream.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Number of bytes streamed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether all armed bytes have been read.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// Collects the OUT data stage of a control transfer into a small fixed buffer.
///
/// The accumulator is armed with the length the host declared in the SETUP packet and then fed by
/// repeated [`write`] calls, one per OUT transaction. Anything past the buffer capacity or the
/// declared length is dropped.
///
/// [`write`]: WriteAccumulator::write
#[derive(Clone, Debug, Default)]
pub struct WriteAccumulator {
    buf: [u8; WRITE_BUFFER_LEN],
    position: usize,
    remaining: usize,
}

impl WriteAccumulator {
    /// Creates an empty accumulator.
    pub const fn new() -> WriteAccumulator {
        WriteAccumulator {
            buf: [0; WRITE_BUFFER_LEN],
            position: 0,
            remaining: 0,
        }
    }

    /// Prepares to receive `declared_length` bytes, clamped to the buffer capacity. Returns the
    /// number of bytes that will be accepted. Previously collected data is cleared.
    pub fn arm(&mut self, declared_length: u16) -> usize {
        self.buf = [0; WRITE_BUFFER_LEN];
        self.position = 0;
        self.remaining = min(declared_length as usize, WRITE_BUFFER_LEN);
        self.remaining
    }

    /// Appends as much of `data` as is still expected and returns whether the transfer is now
    /// complete.
    pub fn write(&mut self, data: &[u8]) -> bool {
        let count = min(data.len(), self.remaining);

        self.buf[self.position..self.position + count].copy_from_slice(&data[..count]);
        self.position += count;
        self.remaining -= count;

        self.remaining == 0
    }

    /// The bytes collected so far.
    pub fn data(&self) -> &[u8] {
        &self.buf[..self.position]
    }

    /// Number of bytes still expected.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether all expected bytes have arrived.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// The first three buffer bytes as a color. Channels the host didn't send read as zero.
    pub fn rgb(&self) -> crate::board::Rgb {
        crate::board::Rgb::new(self.buf[0], self.buf[1], self.buf[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Rgb;

    static BLOB: [u8; 30] = [
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29,
    ];

    #[test]
    fn read_in_chunks() {
        let mut cursor = ReadCursor::new();
        cursor.arm(&BLOB, BLOB.len());

        assert_eq!(cursor.read(8), &BLOB[0..8]);
        assert_eq!(cursor.read(8), &BLOB[8..16]);
        assert_eq!(cursor.read(8), &BLOB[16..24]);
        assert_eq!(cursor.remaining(), 6);
        assert_eq!(cursor.read(8), &BLOB[24..30]);
        assert!(cursor.is_complete());
        assert_eq!(cursor.position(), 30);

        assert!(cursor.read(8).is_empty());
        assert!(cursor.read(8).is_empty());
    }

    #[test]
    fn read_length_clamped_to_blob() {
        let mut cursor = ReadCursor::new();
        cursor.arm(&BLOB, 1000);

        assert_eq!(cursor.remaining(), 30);
        assert_eq!(cursor.read(64).len(), 30);
        assert!(cursor.read(64).is_empty());
    }

    #[test]
    fn rearm_restarts_read() {
        let mut cursor = ReadCursor::new();
        cursor.arm(&BLOB, 10);
        cursor.read(4);

        cursor.arm(&BLOB, 10);
        assert_eq!(cursor.read(4), &BLOB[0..4]);
    }

    #[test]
    fn unarmed_cursor_is_empty() {
        let mut cursor = ReadCursor::new();

        assert!(cursor.is_complete());
        assert!(cursor.read(8).is_empty());
    }

    #[test]
    fn write_rgb() {
        let mut acc = WriteAccumulator::new();
        assert_eq!(acc.arm(3), 3);

        assert!(!acc.write(&[10, 20]));
        assert!(acc.write(&[30]));
        assert_eq!(acc.data(), &[10, 20, 30]);
        assert_eq!(acc.rgb(), Rgb::new(10, 20, 30));
    }

    #[test]
    fn write_clamped_to_capacity() {
        let mut acc = WriteAccumulator::new();
        assert_eq!(acc.arm(20), 8);

        for i in 0..7u8 {
            assert!(!acc.write(&[i]));
        }
        assert!(acc.write(&[7, 8, 9]));
        assert_eq!(acc.data(), &[0, 1, 2, 3, 4, 5, 6, 7]);

        assert!(acc.write(&[10]));
        assert_eq!(acc.data().len(), 8);
    }

    #[test]
    fn write_ten_bytes_at_once() {
        let mut acc = WriteAccumulator::new();
        acc.arm(20);

        assert!(acc.write(&[1; 10]));
        assert_eq!(acc.data(), &[1; 8]);
        assert_eq!(acc.remaining(), 0);
    }

    #[test]
    fn short_payload_reads_zero_channels() {
        let mut acc = WriteAccumulator::new();
        acc.arm(3);
        acc.write(&[9, 9, 9]);

        acc.arm(1);
        assert!(acc.write(&[5]));
        assert_eq!(acc.rgb(), Rgb::new(5, 0, 0));
    }
}
