use crate::encryption::ByteTransform;
use std::io::{self, Write};

/// `Write` adapter that encrypts everything passing through it.
pub struct EncryptingWriter<W: Write> {
    inner: W,
    transform: Box<dyn ByteTransform>,
}

impl<W: Write> EncryptingWriter<W> {
    pub fn new(inner: W, transform: Box<dyn ByteTransform>) -> Self {
        Self { inner, transform }
    }

    /// Writes the transform's trailing bytes and returns the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        let tail = self.transform.finish();
        self.inner.write_all(&tail)?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for EncryptingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let encrypted = self.transform.update(buf);
        self.inner.write_all(&encrypted)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::testing::XorTransform;

    struct Padding;

    impl ByteTransform for Padding {
        fn update(&mut self, data: &[u8]) -> Vec<u8> {
            data.to_vec()
        }

        fn finish(&mut self) -> Vec<u8> {
            vec![0x04; 4]
        }
    }

    #[test]
    fn test_encrypts_chunks() {
        let mut writer = EncryptingWriter::new(Vec::new(), Box::new(XorTransform(0x01)));
        writer.write_all(b"ab").unwrap();
        writer.write_all(b"c").unwrap();
        assert_eq!(writer.finish().unwrap(), b"`cb");
    }

    #[test]
    fn test_finish_appends_tail() {
        let mut writer = EncryptingWriter::new(Vec::new(), Box::new(Padding));
        writer.write_all(b"xy").unwrap();
        assert_eq!(writer.finish().unwrap(), vec![b'x', b'y', 4, 4, 4, 4]);
    }
}
