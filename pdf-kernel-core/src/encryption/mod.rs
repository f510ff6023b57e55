//! Encryption hook consumed by the writer.
//!
//! Cipher internals and key derivation live outside this crate. A security
//! handler only has to hand out a per-object [`ByteTransform`] and the
//! `/Encrypt` dictionary to store in the trailer.

mod writer;

pub use writer::EncryptingWriter;

use crate::objects::{ObjectId, PdfDictionary, PdfObject};

/// Streaming byte transform bound to one indirect object.
pub trait ByteTransform {
    /// Transforms the next chunk of input.
    fn update(&mut self, data: &[u8]) -> Vec<u8>;

    /// Emits whatever the transform still buffers (padding, tags, ...).
    fn finish(&mut self) -> Vec<u8>;
}

/// Security handler plugged into a writer.
pub trait PdfEncryption {
    /// Transform for strings and stream bodies of object `id`.
    fn transform_for(&self, id: ObjectId) -> Box<dyn ByteTransform>;

    /// Dictionary written as the `/Encrypt` object.
    fn encryption_dictionary(&self) -> PdfDictionary;

    /// Only embedded file streams are encrypted.
    fn embedded_files_only(&self) -> bool {
        false
    }

    /// Whether `/Type /Metadata` streams are encrypted.
    fn encrypt_metadata(&self) -> bool {
        true
    }
}

/// Runs `data` through a fresh transform for `id`.
pub fn encrypt_bytes(encryption: &dyn PdfEncryption, id: ObjectId, data: &[u8]) -> Vec<u8> {
    let mut transform = encryption.transform_for(id);
    let mut out = transform.update(data);
    out.extend(transform.finish());
    out
}

/// Whether strings of ordinary objects are encrypted.
pub fn should_encrypt_strings(encryption: &dyn PdfEncryption) -> bool {
    !encryption.embedded_files_only()
}

/// Whether a stream with dictionary `dict` gets its body encrypted.
pub fn should_encrypt_stream(encryption: &dyn PdfEncryption, dict: &PdfDictionary) -> bool {
    let has_crypt_filter = match dict.get("Filter") {
        Some(PdfObject::Name(name)) => name == "Crypt",
        Some(PdfObject::Array(filters)) => filters.contains_name("Crypt"),
        _ => false,
    };
    if has_crypt_filter || dict.is_type("XRef") {
        return false;
    }
    if encryption.embedded_files_only() {
        return dict.is_type("EmbeddedFile");
    }
    if dict.is_type("Metadata") {
        return encryption.encrypt_metadata();
    }
    true
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::objects::PdfName;

    /// XOR "cipher" keyed by object number, enough to observe call sites.
    pub struct XorTransform(pub u8);

    impl ByteTransform for XorTransform {
        fn update(&mut self, data: &[u8]) -> Vec<u8> {
            data.iter().map(|b| b ^ self.0).collect()
        }

        fn finish(&mut self) -> Vec<u8> {
            Vec::new()
        }
    }

    #[derive(Default)]
    pub struct XorEncryption {
        pub embedded_only: bool,
        pub skip_metadata: bool,
    }

    impl PdfEncryption for XorEncryption {
        fn transform_for(&self, id: ObjectId) -> Box<dyn ByteTransform> {
            Box::new(XorTransform(id.number() as u8 | 0x80))
        }

        fn encryption_dictionary(&self) -> PdfDictionary {
            let mut dict = PdfDictionary::new();
            dict.set("Filter", PdfName::new("Xor"));
            dict.set("V", 1);
            dict
        }

        fn embedded_files_only(&self) -> bool {
            self.embedded_only
        }

        fn encrypt_metadata(&self) -> bool {
            !self.skip_metadata
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::XorEncryption;
    use super::*;
    use crate::objects::PdfName;

    #[test]
    fn test_encrypt_bytes_uses_object_key() {
        let enc = XorEncryption::default();
        let out = encrypt_bytes(&enc, ObjectId::new(1, 0), &[0x00, 0xFF]);
        assert_eq!(out, vec![0x81, 0x7E]);
    }

    #[test]
    fn test_crypt_filter_is_skipped() {
        let enc = XorEncryption::default();
        let mut dict = PdfDictionary::new();
        assert!(should_encrypt_stream(&enc, &dict));

        dict.set("Filter", PdfName::new("Crypt"));
        assert!(!should_encrypt_stream(&enc, &dict));

        dict.set(
            "Filter",
            vec![PdfObject::name("FlateDecode"), PdfObject::name("Crypt")],
        );
        assert!(!should_encrypt_stream(&enc, &dict));
    }

    #[test]
    fn test_embedded_files_only_mode() {
        let enc = XorEncryption {
            embedded_only: true,
            ..Default::default()
        };
        assert!(!should_encrypt_strings(&enc));
        assert!(!should_encrypt_stream(&enc, &PdfDictionary::new()));
        assert!(should_encrypt_stream(
            &enc,
            &PdfDictionary::with_type("EmbeddedFile")
        ));
    }

    #[test]
    fn test_metadata_follows_handler() {
        let metadata = PdfDictionary::with_type("Metadata");
        assert!(should_encrypt_stream(&XorEncryption::default(), &metadata));
        let enc = XorEncryption {
            skip_metadata: true,
            ..Default::default()
        };
        assert!(!should_encrypt_stream(&enc, &metadata));
    }

    #[test]
    fn test_xref_streams_never_encrypted() {
        let enc = XorEncryption::default();
        assert!(!should_encrypt_stream(&enc, &PdfDictionary::with_type("XRef")));
    }
}
