use super::object_stream::ObjectStream;
use super::output::PdfOutputStream;
use super::smart::{reference_key, ContentKey, DigestCache};
use super::WriterConfig;
use crate::compression::{self, CompressionLevel};
use crate::document::PdfDocument;
use crate::encryption::{
    encrypt_bytes, should_encrypt_stream, ByteTransform, EncryptingWriter, PdfEncryption,
};
use crate::error::{PdfError, Result};
use crate::meta;
use crate::objects::{
    DocumentId, IndirectRef, ObjectId, ObjectState, PdfArray, PdfDictionary, PdfObject,
    PdfStream, PdfString, StreamContent,
};
use crate::xref::{IndirectReference, Location, TrailerInfo};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, debug_span, trace, warn};

const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Writes the objects of a [`PdfDocument`] as a PDF file.
///
/// Objects can be flushed early with [`flush_object`](Self::flush_object);
/// [`close`](Self::close) flushes everything still pending, then writes the
/// cross-reference section and trailer.
pub struct PdfWriter<W: Write> {
    out: PdfOutputStream<W>,
    config: WriterConfig,
    encryption: Option<Arc<dyn PdfEncryption>>,
    encrypt_reference: Option<IndirectRef>,
    object_stream: Option<ObjectStream>,
    previous_object_stream: Option<IndirectRef>,
    copied: HashMap<(DocumentId, ObjectId), IndirectRef>,
    smart_cache: HashMap<ContentKey, IndirectRef>,
    digests: DigestCache,
    started: bool,
}

impl PdfWriter<BufWriter<File>> {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::create(path, WriterConfig::default())
    }

    pub fn create(path: impl AsRef<Path>, config: WriterConfig) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_config(BufWriter::new(file), config))
    }
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self::with_config(writer, WriterConfig::default())
    }

    pub fn with_config(writer: W, config: WriterConfig) -> Self {
        let mut out = PdfOutputStream::new(writer);
        out.set_high_precision(config.high_precision);
        Self {
            out,
            config,
            encryption: None,
            encrypt_reference: None,
            object_stream: None,
            previous_object_stream: None,
            copied: HashMap::new(),
            smart_cache: HashMap::new(),
            digests: DigestCache::new(),
            started: false,
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Bytes written so far, including a copied original file.
    pub fn position(&self) -> u64 {
        self.out.position()
    }

    /// Encrypts strings and streams with `encryption`. Must be set before
    /// the first object is written.
    pub fn set_encryption(&mut self, encryption: Arc<dyn PdfEncryption>) -> Result<()> {
        if self.started {
            return Err(PdfError::EncryptionError(
                "encryption must be set before writing starts".to_string(),
            ));
        }
        self.encryption = Some(encryption);
        Ok(())
    }

    /// Writes the header (or the original file in append mode). Called
    /// implicitly by the first flush.
    pub fn begin(&mut self, doc: &mut PdfDocument) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        if self.config.append_mode {
            let original = doc.original_bytes().cloned().ok_or_else(|| {
                PdfError::InvalidOperation(
                    "append mode needs a document opened from an existing file".to_string(),
                )
            })?;
            self.out.write_bytes(&original)?;
            if !original.ends_with(b"\n") && !original.ends_with(b"\r") {
                self.out.write_bytes(b"\n")?;
            }
            debug!(bytes = original.len(), "copied original file for incremental update");
        } else {
            let version = self.config.resolve_version(doc.version());
            self.out.write_str(&format!("%PDF-{version}\n"))?;
            doc.set_version(version);
            // Binary comment so transfer tools treat the file as binary
            self.out.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        }

        self.out.set_document(doc.id());
        if let Some(encryption) = &self.encryption {
            self.out.set_encryption(Some(Arc::clone(encryption)));
            let reference = doc.add_object(encryption.encryption_dictionary());
            self.encrypt_reference = Some(reference);
        }
        Ok(())
    }

    /// Writes the object behind `reference` and releases it from memory.
    ///
    /// Objects it references are marked `MUST_BE_FLUSHED`; children that
    /// must be indirect (streams) are promoted first. Flushing the same
    /// object twice fails with [`PdfError::ObjectReleased`].
    pub fn flush_object(&mut self, doc: &mut PdfDocument, reference: IndirectRef) -> Result<()> {
        if reference.document() != doc.id() {
            return Err(PdfError::ForeignReference(reference.id()));
        }
        self.begin(doc)?;
        let id = reference.id();
        let span = debug_span!("flush", object = %id, meta = tracing::field::Empty);
        if let Some(info) = meta::current() {
            span.record("meta", tracing::field::display(&info));
        }
        let _enter = span.enter();
        self.flush_inner(doc, reference).map_err(|e| e.while_writing(id))
    }

    fn flush_inner(&mut self, doc: &mut PdfDocument, reference: IndirectRef) -> Result<()> {
        let id = reference.id();
        let entry = doc
            .xref()
            .lookup(reference)
            .ok_or(PdfError::InvalidObjectReference(id.number(), id.generation()))?;
        if entry.is_flushed() || entry.check_state(ObjectState::READ_ONLY) {
            return Err(PdfError::ObjectReleased(id));
        }
        if entry.is_free() {
            return Err(PdfError::InvalidOperation(format!("object {id} is free")));
        }

        doc.load_object(id.number())?;
        let mut object = doc
            .xref_mut()
            .lookup_mut(reference)
            .and_then(IndirectReference::take_object)
            .ok_or_else(|| PdfError::InvalidOperation(format!("object {id} has no content")))?;
        let forbid_release = object.check_state(ObjectState::FORBID_RELEASE)
            || doc
                .xref()
                .lookup(reference)
                .is_some_and(|e| e.check_state(ObjectState::FORBID_RELEASE));

        prepare_children(doc, &mut object)?;
        let kept = forbid_release.then(|| object.clone());

        let packable = self.config.full_compression
            && id.generation() == 0
            && !matches!(object, PdfObject::Stream(_))
            && Some(reference) != self.encrypt_reference;
        if packable {
            self.write_to_object_stream(doc, reference, &object)?;
        } else {
            self.write_direct(doc, reference, object)?;
        }

        if let Some(entry) = doc.xref_mut().lookup_mut(reference) {
            entry.set_state(ObjectState::FLUSHED | ObjectState::READ_ONLY);
            entry.clear_state(ObjectState::MUST_BE_FLUSHED);
            if let Some(object) = kept {
                entry.set_object(object);
            }
        }
        Ok(())
    }

    fn write_direct(
        &mut self,
        doc: &mut PdfDocument,
        reference: IndirectRef,
        object: PdfObject,
    ) -> Result<()> {
        let id = reference.id();
        let offset = self.out.position();
        if let Some(entry) = doc.xref_mut().lookup_mut(reference) {
            entry.set_offset(offset);
        }
        let encrypt_strings = Some(reference) != self.encrypt_reference;
        self.out.set_current_object(encrypt_strings.then_some(id));
        match object {
            PdfObject::Stream(stream) => self.write_stream_object(doc, id, stream)?,
            other => self.out.write_indirect_object(id, &other)?,
        }
        trace!(object = %id, offset, "wrote object");
        Ok(())
    }

    fn write_to_object_stream(
        &mut self,
        doc: &mut PdfDocument,
        reference: IndirectRef,
        object: &PdfObject,
    ) -> Result<()> {
        if self.object_stream.as_ref().is_some_and(ObjectStream::is_full) {
            self.finish_object_stream(doc)?;
        }

        // The container is encrypted as a whole, so strings stay plain here.
        let mut buffer = PdfOutputStream::new(Vec::new());
        buffer.set_high_precision(self.config.high_precision);
        buffer.set_document(doc.id());
        buffer.write_object(object)?;

        let previous = self.previous_object_stream;
        let stream = self.object_stream.get_or_insert_with(|| {
            let container = doc.create_next_indirect_reference();
            debug!(stream = %container.id(), "starting object stream");
            ObjectStream::new(container, previous)
        });
        let index = stream.add_object(reference.number(), &buffer.into_inner());
        let container = stream.reference().number();
        if let Some(entry) = doc.xref_mut().lookup_mut(reference) {
            entry.set_compressed(container, index);
        }
        trace!(object = %reference.id(), stream = container, index, "packed object");
        Ok(())
    }

    /// Writes the current object stream, if any, as a regular stream.
    fn finish_object_stream(&mut self, doc: &mut PdfDocument) -> Result<()> {
        let Some(stream) = self.object_stream.take() else {
            return Ok(());
        };
        if stream.is_empty() {
            doc.xref_mut().free_reference(stream.reference().number());
            return Ok(());
        }
        let reference = stream.reference();
        debug!(stream = %reference.id(), objects = stream.len(), "finishing object stream");
        doc.set_object(reference, stream.into_stream())?;
        self.previous_object_stream = Some(reference);
        self.flush_inner(doc, reference)
    }

    fn write_stream_object(
        &mut self,
        doc: &mut PdfDocument,
        id: ObjectId,
        stream: PdfStream,
    ) -> Result<()> {
        let explicit_level = stream.compression_level() != CompressionLevel::Undefined;
        let level = stream.compression_level().resolve(self.config.compression_level);
        let metadata = stream.is_metadata();
        let force = stream.force_compression();
        let (mut dict, content) = stream.into_parts();
        let encryption = self
            .encryption
            .as_ref()
            .filter(|e| should_encrypt_stream(e.as_ref(), &dict))
            .cloned();
        let wants_compression = level.is_enabled() && !metadata;

        match content {
            StreamContent::Buffer(data) => {
                let body = if wants_compression && (!dict.contains_key("Filter") || force) {
                    let packed = compression::compress(&data, level)?;
                    compression::update_compression_filter(&mut dict)?;
                    packed
                } else {
                    data
                };
                self.write_buffered_stream(id, dict, body, encryption)
            }
            StreamContent::Original(original) => {
                let mut body = original.as_bytes().to_vec();
                let reencode = if explicit_level {
                    leading_flate_params(&dict)
                } else {
                    None
                };
                if let Some(params) = reencode {
                    let inflated = compression::decompress(&body)?;
                    body = compression::unpredict(&inflated, params.as_ref())?;
                    compression::strip_leading_flate(&mut dict);
                    trace!(object = %id, ?level, "re-encoding original stream");
                }
                if wants_compression && (!dict.contains_key("Filter") || force) {
                    body = compression::compress(&body, level)?;
                    compression::update_compression_filter(&mut dict)?;
                }
                self.write_buffered_stream(id, dict, body, encryption)
            }
            StreamContent::Input(source) => {
                let reader = source.take()?.ok_or_else(|| {
                    PdfError::InvalidStream(format!("input of stream {id} was already consumed"))
                })?;
                let compress = wants_compression && (!dict.contains_key("Filter") || force);
                let transform = encryption.map(|e| e.transform_for(id));
                self.write_input_stream(doc, id, dict, reader, compress.then_some(level), transform)
            }
            StreamContent::Released => Err(PdfError::ObjectReleased(id)),
        }
    }

    /// Deflate (already applied by the caller), then encrypt, then frame.
    fn write_buffered_stream(
        &mut self,
        id: ObjectId,
        mut dict: PdfDictionary,
        body: Vec<u8>,
        encryption: Option<Arc<dyn PdfEncryption>>,
    ) -> Result<()> {
        let body = match encryption {
            Some(encryption) => encrypt_bytes(encryption.as_ref(), id, &body),
            None => body,
        };
        dict.set("Length", body.len());
        self.out.write_object_header(id)?;
        self.out.write_stream(&dict, &body)?;
        self.out.write_object_footer()
    }

    /// Pumps `reader` into the file. The length is only known afterwards,
    /// so `/Length` is an indirect object written right after the stream.
    fn write_input_stream(
        &mut self,
        doc: &mut PdfDocument,
        id: ObjectId,
        mut dict: PdfDictionary,
        mut reader: Box<dyn Read + Send>,
        level: Option<CompressionLevel>,
        transform: Option<Box<dyn ByteTransform>>,
    ) -> Result<()> {
        let length_reference = doc.create_next_indirect_reference();
        dict.set("Length", length_reference);
        if level.is_some() {
            compression::update_compression_filter(&mut dict)?;
        }

        self.out.write_object_header(id)?;
        self.out.write_dictionary(&dict)?;
        self.out.write_bytes(b"\nstream\n")?;
        let start = self.out.position();
        match transform {
            Some(transform) => {
                let mut sink = EncryptingWriter::new(&mut self.out, transform);
                deflate_into(&mut reader, &mut sink, level)?;
                sink.finish()?;
            }
            None => deflate_into(&mut reader, &mut self.out, level)?,
        }
        let length = self.out.position() - start;
        self.out.write_bytes(b"\nendstream")?;
        self.out.write_object_footer()?;

        let offset = self.out.position();
        self.out.set_current_object(Some(length_reference.id()));
        self.out
            .write_indirect_object(length_reference.id(), &PdfObject::from(length as i64))?;
        if let Some(entry) = doc.xref_mut().lookup_mut(length_reference) {
            entry.set_offset(offset);
            entry.set_state(ObjectState::FLUSHED | ObjectState::READ_ONLY);
        }
        trace!(object = %id, length, "pumped input stream");
        Ok(())
    }

    /// Deep copy of `object` from `source` into `dest`.
    ///
    /// References are followed and their targets copied once per writer.
    /// A catalog is never copied (it becomes `null`). In smart mode, targets
    /// with equal content share one copy, except pages.
    pub fn copy_object(
        &mut self,
        dest: &mut PdfDocument,
        source: &mut PdfDocument,
        object: &PdfObject,
    ) -> Result<PdfObject> {
        match object {
            PdfObject::Reference(reference) => self.copy_reference(dest, source, *reference),
            PdfObject::Dictionary(dict) if dict.is_type("Catalog") => {
                warn!("catalog dictionaries are not copied, writing null instead");
                Ok(PdfObject::Null)
            }
            PdfObject::Dictionary(dict) => {
                let mut copy = PdfDictionary::with_capacity(dict.len());
                for (key, value) in dict.iter() {
                    copy.set(key.clone(), self.copy_object(dest, source, value)?);
                }
                *copy.state_mut() = dict.state() & ObjectState::MUST_BE_INDIRECT;
                Ok(PdfObject::Dictionary(copy))
            }
            PdfObject::Array(array) => {
                let mut copy = PdfArray::with_capacity(array.len());
                for value in array.iter() {
                    copy.push(self.copy_object(dest, source, value)?);
                }
                *copy.state_mut() = array.state() & ObjectState::MUST_BE_INDIRECT;
                Ok(PdfObject::Array(copy))
            }
            PdfObject::Stream(stream) => {
                let content = match stream.content() {
                    StreamContent::Input(_) => {
                        return Err(PdfError::InvalidStream(
                            "reader-backed streams cannot be copied".to_string(),
                        ))
                    }
                    StreamContent::Released => {
                        return Err(PdfError::InvalidStream(
                            "stream content was released".to_string(),
                        ))
                    }
                    content => content.clone(),
                };
                let mut dict = PdfDictionary::with_capacity(stream.dictionary().len());
                for (key, value) in stream.dictionary().iter() {
                    dict.set(key.clone(), self.copy_object(dest, source, value)?);
                }
                let mut copy = PdfStream::from_content(dict, content);
                copy.set_compression_level(stream.compression_level());
                copy.set_force_compression(stream.force_compression());
                Ok(PdfObject::Stream(copy))
            }
            primitive => Ok(primitive.clone()),
        }
    }

    fn copy_reference(
        &mut self,
        dest: &mut PdfDocument,
        source: &mut PdfDocument,
        reference: IndirectRef,
    ) -> Result<PdfObject> {
        if reference.document() != source.id() {
            return Err(PdfError::ForeignReference(reference.id()));
        }
        let cache_key = (source.id(), reference.id());
        if let Some(copy) = self.copied.get(&cache_key) {
            return Ok(PdfObject::Reference(*copy));
        }
        let Some(target) = source.get_object(reference)?.cloned() else {
            warn!(reference = %reference.id(), "copied reference has no target, writing null");
            return Ok(PdfObject::Null);
        };
        if target.as_dict().is_some_and(|d| d.is_type("Catalog")) {
            warn!(reference = %reference.id(), "catalog dictionaries are not copied, writing null instead");
            return Ok(PdfObject::Null);
        }

        let smart_key = if self.config.smart_mode && !target.as_dict().is_some_and(|d| d.is_type("Page")) {
            reference_key(source, reference, &mut self.digests)?
        } else {
            None
        };
        if let Some(existing) = smart_key.and_then(|key| self.smart_cache.get(&key)).copied() {
            trace!(reference = %reference.id(), copy = %existing.id(), "reusing equal copy");
            self.copied.insert(cache_key, existing);
            return Ok(PdfObject::Reference(existing));
        }

        // Registered before the content is copied so cycles end here.
        let copy = dest.create_next_indirect_reference();
        self.copied.insert(cache_key, copy);
        if let Some(key) = smart_key {
            self.smart_cache.insert(key, copy);
        }
        let content = self.copy_object(dest, source, &target)?;
        dest.set_object(copy, content)?;
        Ok(PdfObject::Reference(copy))
    }

    /// Flushes every pending object, writes the cross-reference section and
    /// trailer, and returns the underlying writer.
    pub fn close(mut self, doc: &mut PdfDocument) -> Result<W> {
        self.begin(doc)?;
        update_info(doc)?;
        if !self.config.append_mode {
            drop_original_containers(doc)?;
        }

        loop {
            let pending: Vec<IndirectRef> = doc
                .xref()
                .iter()
                .filter(|e| self.is_pending(e))
                .map(IndirectReference::reference)
                .collect();
            if pending.is_empty() {
                break;
            }
            for reference in pending {
                if !doc.xref().lookup(reference).is_some_and(|e| self.is_pending(e)) {
                    continue;
                }
                doc.load_object(reference.number())?;
                if !doc.xref().lookup(reference).is_some_and(IndirectReference::has_object) {
                    warn!(reference = %reference.id(), "object was never set, freeing it");
                    doc.xref_mut().free_reference(reference.number());
                    continue;
                }
                self.flush_object(doc, reference)?;
            }
        }
        self.finish_object_stream(doc)?;

        let generated = self
            .config
            .file_id
            .unwrap_or_else(|| generate_file_id(doc.id(), self.out.position()));
        let original_id = if self.config.append_mode {
            doc.trailer()
                .get_array("ID")
                .and_then(|id| id.get(0))
                .and_then(PdfObject::as_string)
                .map(|s| s.as_bytes().to_vec())
        } else {
            None
        };
        let first = original_id.unwrap_or_else(|| generated.to_vec());

        let encrypt = self.encrypt_reference.or_else(|| {
            self.config
                .append_mode
                .then(|| doc.trailer().get_reference("Encrypt"))
                .flatten()
        });
        let trailer = doc.trailer().clone();
        let previous = doc.startxref();
        let info = TrailerInfo {
            trailer: &trailer,
            file_id: (first.as_slice(), &generated[..]),
            encrypt,
            previous,
            append_mode: self.config.append_mode,
            full_compression: self.config.full_compression,
            compression: self.config.compression_level.resolve(CompressionLevel::Default),
        };
        let startxref = doc.xref_mut().write_xref_table_and_trailer(&mut self.out, info)?;
        debug!(?startxref, size = self.out.position(), "closed writer");

        self.out.flush()?;
        Ok(self.out.into_inner())
    }

    fn is_pending(&self, entry: &IndirectReference) -> bool {
        if entry.number() == 0 || entry.is_free() || entry.is_flushed() {
            return false;
        }
        if self
            .object_stream
            .as_ref()
            .is_some_and(|s| s.reference().number() == entry.number())
        {
            return false;
        }
        !self.config.append_mode
            || entry.check_state(ObjectState::MODIFIED)
            || (entry.check_state(ObjectState::MUST_BE_FLUSHED) && entry.has_object())
    }
}

fn update_info(doc: &mut PdfDocument) -> Result<()> {
    let Some(info) = doc.trailer().get_reference("Info") else {
        return Ok(());
    };
    if doc.xref().lookup(info).is_some_and(IndirectReference::is_flushed) {
        debug!("info dictionary already written, not updating it");
        return Ok(());
    }
    let dict = doc.info_mut()?;
    dict.set("Producer", PdfString::new(PRODUCER));
    dict.set("ModDate", PdfString::new(format_pdf_date(Utc::now())));
    Ok(())
}

/// Promotes children that must be indirect, replaces dangling references
/// with null, and marks referenced objects `MUST_BE_FLUSHED`.
fn prepare_children(doc: &mut PdfDocument, object: &mut PdfObject) -> Result<()> {
    match object {
        PdfObject::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                prepare_value(doc, value)?;
            }
        }
        PdfObject::Stream(stream) => {
            for (_, value) in stream.dictionary_mut().iter_mut() {
                prepare_value(doc, value)?;
            }
        }
        PdfObject::Array(array) => {
            for value in array.iter_mut() {
                prepare_value(doc, value)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn prepare_value(doc: &mut PdfDocument, value: &mut PdfObject) -> Result<()> {
    if let PdfObject::Reference(reference) = *value {
        if reference.document() != doc.id() {
            return Err(PdfError::ForeignReference(reference.id()));
        }
        match doc.xref_mut().lookup_mut(reference) {
            Some(entry) if !entry.is_free() => {
                if !entry.is_flushed() {
                    entry.set_state(ObjectState::MUST_BE_FLUSHED);
                }
            }
            _ => {
                warn!(reference = %reference.id(), "dangling reference written as null");
                *value = PdfObject::Null;
            }
        }
    } else if value.check_state(ObjectState::MUST_BE_INDIRECT) {
        let promoted = doc.add_object(std::mem::take(value));
        if let Some(entry) = doc.xref_mut().lookup_mut(promoted) {
            entry.set_state(ObjectState::MUST_BE_FLUSHED);
        }
        trace!(object = %promoted.id(), "promoted child to indirect object");
        *value = PdfObject::Reference(promoted);
    } else {
        prepare_children(doc, value)?;
    }
    Ok(())
}

/// Object streams and xref streams of the original file describe its old
/// layout; a full rewrite replaces them.
fn drop_original_containers(doc: &mut PdfDocument) -> Result<()> {
    if doc.original_bytes().is_none() {
        return Ok(());
    }
    let candidates: Vec<u32> = doc
        .xref()
        .iter()
        .filter(|e| {
            e.number() != 0
                && !e.is_free()
                && !e.is_flushed()
                && matches!(e.location(), Location::Offset(offset) if offset > 0)
        })
        .map(IndirectReference::number)
        .collect();
    // Load everything first; compressed objects need their container.
    let compressed: Vec<u32> = doc
        .xref()
        .iter()
        .filter(|e| e.object_stream_number().is_some() && !e.is_free())
        .map(IndirectReference::number)
        .collect();
    for number in compressed.iter().chain(candidates.iter()) {
        doc.load_object(*number)?;
    }
    for number in candidates {
        let is_container = doc
            .xref()
            .get(number)
            .and_then(IndirectReference::object)
            .and_then(PdfObject::as_stream)
            .is_some_and(|s| s.dictionary().is_type("ObjStm") || s.dictionary().is_type("XRef"));
        if is_container {
            trace!(number, "dropping original container stream");
            doc.xref_mut().free_reference(number);
        }
    }
    Ok(())
}

/// Decode parameters of a leading Flate filter, or `None` when the first
/// filter is something else.
fn leading_flate_params(dict: &PdfDictionary) -> Option<Option<PdfDictionary>> {
    let is_flate = |o: &PdfObject| o.as_name().is_some_and(|n| n == "FlateDecode" || n == "Fl");
    let filter = dict.get("Filter")?;
    match filter {
        PdfObject::Name(_) if is_flate(filter) => Some(dict.get_dict("DecodeParms").cloned()),
        PdfObject::Array(filters) if filters.get(0).is_some_and(is_flate) => Some(
            dict.get_array("DecodeParms")
                .and_then(|p| p.get(0))
                .and_then(PdfObject::as_dict)
                .cloned(),
        ),
        _ => None,
    }
}

fn deflate_into<S: Write>(
    reader: &mut dyn Read,
    mut sink: S,
    level: Option<CompressionLevel>,
) -> io::Result<()> {
    match level {
        #[cfg(feature = "compression")]
        Some(level) => {
            let mut encoder = flate2::write::ZlibEncoder::new(sink, level.to_flate());
            io::copy(reader, &mut encoder)?;
            encoder.finish()?;
        }
        _ => {
            io::copy(reader, &mut sink)?;
        }
    }
    Ok(())
}

fn generate_file_id(document: DocumentId, size: u64) -> [u8; 16] {
    let seed = format!("{}:{}:{}", Utc::now().to_rfc3339(), document.value(), size);
    md5::compute(seed.as_bytes()).0
}

/// Format a DateTime as a PDF date string (D:YYYYMMDDHHmmSSOHH'mm)
pub fn format_pdf_date(date: DateTime<Utc>) -> String {
    let formatted = date.format("D:%Y%m%d%H%M%S");

    // For UTC, the offset is always +00'00
    format!("{formatted}+00'00")
}
