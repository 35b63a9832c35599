use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::warn;

use crate::document::{Document, IndirectObject, CATALOG_ID, INFO_ID};
use crate::filters;
use crate::save_options::{Identifier, SaveOptions};
use crate::{Dictionary, Object, Result, Stream};

impl Document {
    /// Save PDF document to specified file path.
    #[inline]
    pub fn save<P: AsRef<Path>>(&mut self, path: P, options: SaveOptions) -> Result<File> {
        let mut file = BufWriter::new(File::create(path)?);
        self.save_internal(&mut file, options)?;
        Ok(file.into_inner().map_err(io::Error::from)?)
    }

    /// Save PDF to arbitrary target
    #[inline]
    pub fn save_to<W: Write>(&mut self, target: &mut W, options: SaveOptions) -> Result<()> {
        self.save_internal(target, options)
    }

    fn save_internal<W: Write>(&mut self, target: &mut W, options: SaveOptions) -> Result<()> {
        let mut target = CountingWrite {
            inner: target,
            bytes_written: 0,
        };

        writeln!(target, "%PDF-{}", options.version)?;
        target.write_all(b"%\xf0\x9f\x96\xa4\n")?;

        if options.version.as_bytes() >= "1.5".as_bytes() && options.compress {
            self.save_compressed(&mut target, &options)
        } else {
            self.save_classic(&mut target, &options)
        }
    }

    fn save_classic<W: Write>(
        &mut self, target: &mut CountingWrite<&mut W>, options: &SaveOptions,
    ) -> Result<()> {
        for entry in &mut self.objects {
            if !entry.used {
                continue;
            }
            Writer::write_indirect_object(target, entry)?;
        }

        let xref_position = target.bytes_written;
        writeln!(target, "xref\n0 {}", self.objects.len())?;
        for entry in &self.objects {
            let kind = if entry.used { 'n' } else { 'f' };
            writeln!(target, "{:>010} {:>05} {} ", entry.offset, entry.generation, kind)?;
        }

        writeln!(target, "trailer\n<<\n/Size {}", self.objects.len())?;
        writeln!(target, "/Root {} {} R", CATALOG_ID.0, CATALOG_ID.1)?;
        writeln!(target, "/Info {} {} R", INFO_ID.0, INFO_ID.1)?;
        if let Some((first, second)) = self.identifier_pair(&options.identifier) {
            target.write_all(b"/ID [")?;
            Writer::write_object(target, &first)?;
            target.write_all(b" ")?;
            Writer::write_object(target, &second)?;
            target.write_all(b"]\n")?;
        }
        writeln!(target, ">>\nstartxref\n{}\n%%EOF", xref_position)?;
        Ok(())
    }

    fn save_compressed<W: Write>(
        &mut self, target: &mut CountingWrite<&mut W>, options: &SaveOptions,
    ) -> Result<()> {
        for entry in &mut self.objects {
            if !entry.used || entry.compressible() {
                continue;
            }
            Writer::write_indirect_object(target, entry)?;
        }

        // Object-stream payload: an index of "number position" pairs, then
        // one fragment per object body, so the newline joints between
        // fragments land exactly where the index says each body starts.
        let compressed_numbers: Vec<u32> = self
            .objects
            .iter()
            .filter(|entry| entry.compressible())
            .map(|entry| entry.number)
            .collect();
        let mut index = String::new();
        let mut bodies = Vec::with_capacity(compressed_numbers.len());
        let mut position = 0;
        for &number in &compressed_numbers {
            let body = Writer::object_bytes(&self.objects[number as usize].object);
            if !index.is_empty() {
                index.push(' ');
            }
            index.push_str(&format!("{} {}", number, position));
            position += body.len() + 1;
            bodies.push(Object::Bytes(body));
        }

        let first = index.len() + 1;
        let mut content = Vec::with_capacity(bodies.len() + 1);
        content.push(Object::bytes(index));
        content.extend(bodies);
        let object_stream = Stream::new(
            dictionary! {
                "Type" => "/ObjStm",
                "N" => compressed_numbers.len() as i64,
                "First" => first as i64,
            },
            content,
        )
        .with_compression(true);
        let (object_stream_number, _) = self.add_object(object_stream);
        Writer::write_indirect_object(target, &mut self.objects[object_stream_number as usize])?;

        // One cross-reference entry per object, plus one for the
        // cross-reference stream written below.
        let mut entries: Vec<[u64; 3]> = Vec::with_capacity(self.objects.len() + 1);
        let mut dict_index = 0;
        for entry in &self.objects {
            if entry.compressible() {
                entries.push([2, u64::from(object_stream_number), dict_index]);
                dict_index += 1;
            } else {
                let status = u64::from(entry.number != 0);
                entries.push([status, entry.offset as u64, u64::from(entry.generation)]);
            }
        }
        let xref_position = target.bytes_written;
        entries.push([1, xref_position as u64, 0]);

        let max_generation = self
            .objects
            .iter()
            .map(|entry| u64::from(entry.generation))
            .max()
            .unwrap_or(0);
        let widths = [
            1,
            field_width(xref_position as u64),
            field_width(max_generation.max(compressed_numbers.len() as u64)),
        ];
        let mut packed = Vec::with_capacity(entries.len() * (widths[0] + widths[1] + widths[2]));
        for entry in &entries {
            for (&value, width) in entry.iter().zip(widths) {
                for shift in (0..width).rev() {
                    packed.push((value >> (8 * shift)) as u8);
                }
            }
        }

        let size = self.objects.len() as i64 + 1;
        let mut extra = dictionary! {
            "Type" => "/XRef",
            "Index" => vec![0.into(), size.into()],
            "W" => vec![
                (widths[0] as i64).into(),
                (widths[1] as i64).into(),
                (widths[2] as i64).into(),
            ],
            "Size" => size,
            "Root" => Object::Reference(CATALOG_ID),
            "Info" => Object::Reference(INFO_ID),
        };
        if let Some((first, second)) = self.identifier_pair(&options.identifier) {
            extra.set("ID", vec![first, second]);
        }

        let xref_stream = Stream::new(extra, vec![Object::Bytes(packed)]).with_compression(true);
        let (xref_stream_number, _) = self.add_object(xref_stream);
        Writer::write_indirect_object(target, &mut self.objects[xref_stream_number as usize])?;

        writeln!(target, "startxref\n{}\n%%EOF", xref_position)?;
        Ok(())
    }

    /// Both `/ID` halves, or None when no identifier was requested. The
    /// second half is always the MD5 digest of the non-free object bodies
    /// in insertion order; a generated first half reuses it.
    fn identifier_pair(&self, identifier: &Identifier) -> Option<(Object, Object)> {
        let supplied = match identifier {
            Identifier::Omit => return None,
            Identifier::Generate => None,
            Identifier::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        };

        let mut data = Vec::new();
        for entry in &self.objects {
            if entry.used {
                data.extend_from_slice(&Writer::object_bytes(&entry.object));
            }
        }
        let hash = format!("{:x}", md5::compute(&data));
        let first = supplied.unwrap_or_else(|| hash.clone());
        Some((Object::Text(first), Object::Text(hash)))
    }
}

pub struct Writer;

impl Writer {
    /// Serialize any value to its body bytes.
    pub fn object_bytes(object: &Object) -> Vec<u8> {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        Writer::write_object(&mut buffer, object).unwrap();
        buffer
    }

    fn write_indirect_object<W: Write>(
        target: &mut CountingWrite<&mut W>, entry: &mut IndirectObject,
    ) -> io::Result<()> {
        entry.offset = target.bytes_written;
        writeln!(target, "{} {} obj", entry.number, entry.generation)?;
        Writer::write_object(target, &entry.object)?;
        target.write_all(b"\nendobj\n")?;
        Ok(())
    }

    pub fn write_object(file: &mut dyn Write, object: &Object) -> io::Result<()> {
        match object {
            Object::Boolean(value) => {
                if *value {
                    file.write_all(b"true")
                } else {
                    file.write_all(b"false")
                }
            }
            Object::Integer(value) => {
                let mut buffer = itoa::Buffer::new();
                file.write_all(buffer.format(*value).as_bytes())
            }
            Object::Real(value) => file.write_all(format_real(*value).as_bytes()),
            Object::Name(name) => file.write_all(name.as_bytes()),
            Object::Bytes(bytes) => file.write_all(bytes),
            Object::Text(text) => Writer::write_text(file, text),
            Object::Array(array) => Writer::write_array(file, array),
            Object::Dictionary(dict) => Writer::write_dictionary(file, dict),
            Object::Stream(stream) => Writer::write_stream(file, stream),
            Object::Reference(id) => write!(file, "{} {} R", id.0, id.1),
        }
    }

    fn write_text(file: &mut dyn Write, text: &str) -> io::Result<()> {
        if text.chars().all(|c| (' '..='~').contains(&c)) {
            // Literal form, with backslash and parentheses escaped.
            file.write_all(b"(")?;
            for &byte in text.as_bytes() {
                if let b'\\' | b'(' | b')' = byte {
                    file.write_all(b"\\")?;
                }
                file.write_all(&[byte])?;
            }
            file.write_all(b")")
        } else {
            // Hex form: UTF-16BE code units behind a byte-order mark.
            file.write_all(b"<feff")?;
            for unit in text.encode_utf16() {
                write!(file, "{:04x}", unit)?;
            }
            file.write_all(b">")
        }
    }

    fn write_array(file: &mut dyn Write, array: &[Object]) -> io::Result<()> {
        file.write_all(b"[")?;
        for (index, object) in array.iter().enumerate() {
            if index > 0 {
                file.write_all(b" ")?;
            }
            Writer::write_object(file, object)?;
        }
        file.write_all(b"]")
    }

    fn write_dictionary(file: &mut dyn Write, dictionary: &Dictionary) -> io::Result<()> {
        file.write_all(b"<<")?;
        for (key, value) in dictionary.iter() {
            write!(file, " /{} ", key)?;
            Writer::write_object(file, value)?;
        }
        file.write_all(b" >>")
    }

    fn write_stream(file: &mut dyn Write, stream: &Stream) -> io::Result<()> {
        let mut payload = Vec::new();
        for (index, fragment) in stream.content.iter().enumerate() {
            if index > 0 {
                payload.push(b'\n');
            }
            Writer::write_object(&mut payload, fragment)?;
        }

        let mut dict = stream.dict.clone();
        if stream.compress {
            dict.set("Filter", "/FlateDecode");
            payload = filters::deflate(&payload);
        }
        dict.set("Length", payload.len() as i64);

        Writer::write_dictionary(file, &dict)?;
        file.write_all(b"\nstream\n")?;
        file.write_all(&payload)?;
        file.write_all(b"\nendstream")
    }
}

/// Shortest decimal that round-trips; integral values drop the fraction.
pub fn format_real(value: f64) -> String {
    if !value.is_finite() {
        warn!("replacing non-finite number {} with 0", value);
        return "0".to_string();
    }
    if value == value.trunc() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value as i64).to_string();
    }
    value.to_string()
}

/// Number of big-endian bytes needed to hold values up to `max_value`.
fn field_width(max_value: u64) -> usize {
    let mut width = 1;
    let mut limit: u128 = 256;
    while u128::from(max_value) >= limit {
        width += 1;
        limit *= 256;
    }
    width
}

pub struct CountingWrite<W: Write> {
    inner: W,
    bytes_written: usize,
}

impl<W: Write> Write for CountingWrite<W> {
    #[inline]
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        let result = self.inner.write(buffer);
        if let Ok(bytes) = result {
            self.bytes_written += bytes;
        }
        result
    }

    #[inline]
    fn write_all(&mut self, buffer: &[u8]) -> io::Result<()> {
        self.bytes_written += buffer.len();
        // On Err the count may overstate what reached the sink; the whole
        // save is abandoned at that point, so the count is never read.
        self.inner.write_all(buffer)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
