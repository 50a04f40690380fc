use crate::config::Beautify;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::io::Write;

/// Writes edited records with the framing chosen by [`Beautify`].
pub struct RecordWriter<W: Write> {
    writer: W,
    beautify: Beautify,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    /// Create a writer and emit the opening bracket, if any.
    pub fn new(mut writer: W, beautify: Beautify) -> Result<Self> {
        match beautify {
            Beautify::Array => write!(writer, "[")?,
            Beautify::Dict => write!(writer, "{{")?,
            Beautify::None => {}
        }
        Ok(RecordWriter {
            writer,
            beautify,
            written: 0,
        })
    }

    /// Write one record. `index` is its position in the input file and keys
    /// the record in dict framing.
    pub fn write_record(&mut self, index: usize, record: &Value) -> Result<()> {
        match self.beautify {
            Beautify::None => {
                serde_json::to_writer(&mut self.writer, record)
                    .context("Failed to serialize record")?;
                writeln!(self.writer).context("Failed to write record")?;
            }
            Beautify::Array | Beautify::Dict => {
                if self.written > 0 {
                    write!(self.writer, ",")?;
                }
                writeln!(self.writer)?;
                if self.beautify == Beautify::Dict {
                    write!(self.writer, "\"{}\": ", index)?;
                }
                let mut ser = serde_json::Serializer::with_formatter(
                    &mut self.writer,
                    PrettyFormatter::with_indent(b"    "),
                );
                sort_keys(record)
                    .serialize(&mut ser)
                    .context("Failed to serialize record")?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Close the framing, flush, and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        match self.beautify {
            Beautify::Array => writeln!(self.writer, "\n]")?,
            Beautify::Dict => writeln!(self.writer, "\n}}")?,
            Beautify::None => {}
        }
        self.writer.flush().context("Failed to flush writer")?;
        Ok(self.writer)
    }
}

/// Copy of `value` with every object's keys in sorted order. Pretty
/// framing writes records this way; compact lines keep record order.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
