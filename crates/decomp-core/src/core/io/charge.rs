use crate::core::models::selector::ResidueSelector;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Field positions are 1-indexed, matching the column documentation of the format.
pub const RESIDUE_NAME_FIELD: usize = 4;
pub const RESIDUE_NUMBER_FIELD: usize = 5;
pub const CHARGE_FIELD: usize = 9;
pub const MIN_RECORD_FIELDS: usize = CHARGE_FIELD;

/// Charge written into records of the neutralized residue.
pub const NEUTRAL_CHARGE: &str = "0.0000";

/// Chain/record terminators closing an isolated-residue structure.
pub const TERMINATOR_LINES: [&str; 2] = ["TER", "END"];

#[derive(Debug, Error)]
pub enum ChargeFormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ChargeParseErrorKind,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChargeParseErrorKind {
    #[error("ATOM/HETATM record has {found} fields, expected at least {expected}")]
    TooFewFields { found: usize, expected: usize },
}

/// Byte range of one whitespace-delimited field within its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub start: usize,
    pub end: usize,
}

impl FieldSpan {
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

fn field_spans(line: &str) -> Vec<FieldSpan> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push(FieldSpan { start: s, end: i });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push(FieldSpan {
            start: s,
            end: line.len(),
        });
    }
    spans
}

/// A single atom line of a charge-annotated structure.
///
/// The raw line (including its terminator, if any) is kept verbatim together
/// with the byte span of every field, so edits touch exactly one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRecord {
    raw: String,
    fields: Vec<FieldSpan>,
}

impl ChargeRecord {
    /// Returns `Ok(None)` for lines that are not `ATOM`/`HETATM` records.
    pub fn parse(raw: &str) -> Result<Option<Self>, ChargeParseErrorKind> {
        let fields = field_spans(raw);
        let Some(first) = fields.first() else {
            return Ok(None);
        };
        let record_type = &raw[first.start..first.end];
        if record_type != "ATOM" && record_type != "HETATM" {
            return Ok(None);
        }
        if fields.len() < MIN_RECORD_FIELDS {
            return Err(ChargeParseErrorKind::TooFewFields {
                found: fields.len(),
                expected: MIN_RECORD_FIELDS,
            });
        }
        Ok(Some(Self {
            raw: raw.to_string(),
            fields,
        }))
    }

    pub fn field(&self, position: usize) -> Option<&str> {
        let span = self.fields.get(position.checked_sub(1)?)?;
        Some(&self.raw[span.start..span.end])
    }

    pub fn field_span(&self, position: usize) -> Option<FieldSpan> {
        self.fields.get(position.checked_sub(1)?).copied()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn residue_name(&self) -> &str {
        self.field(RESIDUE_NAME_FIELD).unwrap_or_default()
    }

    pub fn residue_number(&self) -> &str {
        self.field(RESIDUE_NUMBER_FIELD).unwrap_or_default()
    }

    pub fn charge(&self) -> &str {
        self.field(CHARGE_FIELD).unwrap_or_default()
    }

    pub fn belongs_to(&self, selector: &ResidueSelector) -> bool {
        selector.matches(self.residue_name(), self.residue_number())
    }

    /// Replaces a field with `value`, left-padding it with spaces so the field
    /// keeps its original width. A value wider than the field grows the line.
    ///
    /// Returns `false` if the record has no such field.
    pub fn overwrite_field(&mut self, position: usize, value: &str) -> bool {
        let Some(index) = position.checked_sub(1) else {
            return false;
        };
        let Some(span) = self.fields.get(index).copied() else {
            return false;
        };

        let pad = span.width().saturating_sub(value.len());
        let replacement = format!("{}{}", " ".repeat(pad), value);
        self.raw.replace_range(span.start..span.end, &replacement);

        let growth = replacement.len() - span.width();
        self.fields[index] = FieldSpan {
            start: span.start + pad,
            end: span.start + replacement.len(),
        };
        for later in &mut self.fields[index + 1..] {
            later.start += growth;
            later.end += growth;
        }
        true
    }

    /// Zeroes the charge field in place.
    pub fn neutralize(&mut self) {
        self.overwrite_field(CHARGE_FIELD, NEUTRAL_CHARGE);
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn ensure_line_terminated(&mut self) {
        if !self.raw.ends_with('\n') {
            self.raw.push('\n');
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureLine {
    Record(ChargeRecord),
    Other(String),
}

impl StructureLine {
    pub fn as_str(&self) -> &str {
        match self {
            StructureLine::Record(record) => record.as_str(),
            StructureLine::Other(raw) => raw,
        }
    }
}

/// A charge-annotated structure, kept line by line.
///
/// Serializing an unmodified structure reproduces its input exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeStructure {
    lines: Vec<StructureLine>,
}

impl ChargeStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, ChargeFormatError> {
        let mut lines = Vec::new();
        for (line_num, raw) in text.split_inclusive('\n').enumerate() {
            let line = match ChargeRecord::parse(raw) {
                Ok(Some(record)) => StructureLine::Record(record),
                Ok(None) => StructureLine::Other(raw.to_string()),
                Err(kind) => {
                    return Err(ChargeFormatError::Parse {
                        line: line_num + 1,
                        kind,
                    });
                }
            };
            lines.push(line);
        }
        Ok(Self { lines })
    }

    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, ChargeFormatError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ChargeFormatError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        for line in &self.lines {
            writer.write_all(line.as_str().as_bytes())?;
        }
        writer.flush()
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }

    pub fn to_text(&self) -> String {
        self.lines.iter().map(StructureLine::as_str).collect()
    }

    pub fn lines(&self) -> &[StructureLine] {
        &self.lines
    }

    pub fn records(&self) -> impl Iterator<Item = &ChargeRecord> {
        self.lines.iter().filter_map(|line| match line {
            StructureLine::Record(record) => Some(record),
            StructureLine::Other(_) => None,
        })
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut ChargeRecord> {
        self.lines.iter_mut().filter_map(|line| match line {
            StructureLine::Record(record) => Some(record),
            StructureLine::Other(_) => None,
        })
    }

    /// Appends a record, terminating the previous line first if needed.
    pub fn push_record(&mut self, mut record: ChargeRecord) {
        self.terminate_last_line();
        record.ensure_line_terminated();
        self.lines.push(StructureLine::Record(record));
    }

    /// Appends a non-record line such as `TER`.
    pub fn push_line(&mut self, content: &str) {
        self.terminate_last_line();
        let mut raw = content.to_string();
        if !raw.ends_with('\n') {
            raw.push('\n');
        }
        self.lines.push(StructureLine::Other(raw));
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn terminate_last_line(&mut self) {
        match self.lines.last_mut() {
            Some(StructureLine::Record(record)) => record.ensure_line_terminated(),
            Some(StructureLine::Other(raw)) if !raw.ends_with('\n') => raw.push('\n'),
            _ => {}
        }
    }
}
