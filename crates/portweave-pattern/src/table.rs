//! Delimited text form of the edge table
//!
//! One record per edge: the source identifier split into `from_0..`, the
//! destination into `to_0..`, then the edge columns. Unquoted fields are
//! typed on read (integer key tokens, then bool, int, float values); quoted
//! fields stay strings, so string cells that look like numbers are quoted.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use portweave_core::{AttrValue, PortId, Token, WeaveError, WeaveResult};
use tracing::{debug, warn};

use crate::{Conn, Pattern};

/// Delimited text configuration
#[derive(Clone, Debug)]
pub struct CsvConfig {
    pub delimiter: char,
    /// First record names the columns
    pub header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            delimiter: ',',
            header: true,
        }
    }
}

impl CsvConfig {
    pub fn tsv() -> Self {
        CsvConfig {
            delimiter: '\t',
            header: true,
        }
    }
}

impl Pattern {
    /// Write the edge table, one record per edge in canonical order
    pub fn write_csv<W: Write>(&self, mut writer: W, config: &CsvConfig) -> WeaveResult<()> {
        let levels = self.levels();
        let delim = config.delimiter;
        if config.header {
            let names: Vec<String> = (0..levels)
                .map(|i| format!("from_{}", i))
                .chain((0..levels).map(|i| format!("to_{}", i)))
                .chain(self.columns().iter().cloned())
                .collect();
            write_record(&mut writer, names.iter().map(|n| Cell::plain(n)), delim)?;
        }
        for ((s, d), vals) in self.edges() {
            let fields = s
                .tokens()
                .iter()
                .chain(d.tokens())
                .map(token_cell)
                .chain(vals.iter().map(value_cell));
            write_record(&mut writer, fields, delim)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>, config: &CsvConfig) -> WeaveResult<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(BufWriter::new(file), config)
    }

    /// Replace the edge table with the records read from `reader`.
    ///
    /// Returns the number of edges loaded. Endpoints are not required to be
    /// ports of this pattern; each unknown one is logged.
    pub fn read_csv<R: Read>(&mut self, mut reader: R, config: &CsvConfig) -> WeaveResult<usize> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let mut records = parse_records(&text, config.delimiter)?.into_iter();

        let levels = self.levels();
        let key_width = 2 * levels;
        let columns: Vec<String> = if config.header {
            let header = records
                .next()
                .ok_or_else(|| WeaveError::MalformedTable("missing header".to_string()))?;
            if header.len() < key_width {
                return Err(WeaveError::MalformedTable(format!(
                    "header has {} fields, need at least {}",
                    header.len(),
                    key_width
                )));
            }
            header[key_width..].iter().map(|f| f.text.clone()).collect()
        } else {
            self.columns().to_vec()
        };
        crate::pattern::validate_edge_columns(&columns)?;

        let width = key_width + columns.len();
        let mut edges: BTreeMap<Conn, Vec<AttrValue>> = BTreeMap::new();
        let mut sources: HashMap<PortId, PortId> = HashMap::new();
        let mut unknown: HashSet<PortId> = HashSet::new();
        for (line, record) in records.enumerate() {
            if record.len() != width {
                return Err(WeaveError::MalformedTable(format!(
                    "record {} has {} fields, expected {}",
                    line + 1,
                    record.len(),
                    width
                )));
            }
            let src: PortId = record[..levels].iter().map(Field::token).collect();
            let dst: PortId = record[levels..key_width].iter().map(Field::token).collect();
            let vals = record[key_width..].iter().map(Field::value).collect();

            for id in [&src, &dst] {
                if !self.interface().contains(id) && unknown.insert(id.clone()) {
                    warn!(port = %id, "loaded edge references a port outside the pattern");
                }
            }
            if let Some(existing) = sources.get(&dst) {
                if *existing == src {
                    return Err(WeaveError::DuplicateIdentifier(format!("{} -> {}", src, dst)));
                }
                return Err(WeaveError::FanIn {
                    from: src.to_selector(),
                    to: dst.to_selector(),
                    existing: existing.to_selector(),
                });
            }
            sources.insert(dst.clone(), src.clone());
            edges.insert((src, dst), vals);
        }

        let count = edges.len();
        self.replace_edges(columns, edges, sources);
        debug!(edges = count, unknown = unknown.len(), "loaded edge table");
        Ok(count)
    }

    pub fn load_csv(&mut self, path: impl AsRef<Path>, config: &CsvConfig) -> WeaveResult<usize> {
        let file = File::open(path.as_ref())?;
        self.read_csv(BufReader::new(file), config)
    }
}

/// Outgoing field; `literal` forces quoting so the text is read back as a string
struct Cell<'a> {
    text: Cow<'a, str>,
    literal: bool,
}

impl<'a> Cell<'a> {
    fn plain(text: &'a str) -> Self {
        Cell {
            text: Cow::Borrowed(text),
            literal: false,
        }
    }
}

fn token_cell(token: &Token) -> Cell<'_> {
    match token {
        Token::Int(v) => Cell {
            text: Cow::Owned(v.to_string()),
            literal: false,
        },
        Token::Str(s) => Cell {
            text: Cow::Borrowed(s),
            literal: matches!(Token::parse_field(s), Token::Int(_)),
        },
    }
}

fn value_cell(value: &AttrValue) -> Cell<'_> {
    match value {
        AttrValue::Str(s) => Cell {
            text: Cow::Borrowed(s),
            literal: !matches!(AttrValue::parse_field(s), AttrValue::Str(_)),
        },
        other => Cell {
            text: Cow::Owned(other.to_string()),
            literal: false,
        },
    }
}

fn write_record<'a, W: Write>(
    writer: &mut W,
    cells: impl Iterator<Item = Cell<'a>>,
    delim: char,
) -> WeaveResult<()> {
    let mut line = String::new();
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            line.push(delim);
        }
        line.push_str(&quote(&cell, delim));
    }
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    Ok(())
}

fn quote<'c>(cell: &'c Cell<'_>, delim: char) -> Cow<'c, str> {
    let field: &str = &cell.text;
    if cell.literal || field.contains(delim) || field.contains(['"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Incoming field
#[derive(Debug, Default)]
struct Field {
    text: String,
    quoted: bool,
}

impl Field {
    fn token(&self) -> Token {
        if self.quoted {
            Token::Str(self.text.clone())
        } else {
            Token::parse_field(&self.text)
        }
    }

    fn value(&self) -> AttrValue {
        if self.quoted {
            AttrValue::Str(self.text.clone())
        } else {
            AttrValue::parse_field(&self.text)
        }
    }
}

/// Split text into records of fields. Quoted fields may hold delimiters,
/// doubled quotes and line breaks. Blank lines are skipped.
fn parse_records(text: &str, delim: char) -> WeaveResult<Vec<Vec<Field>>> {
    let mut records = Vec::new();
    let mut record: Vec<Field> = Vec::new();
    let mut field = Field::default();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.text.push('"');
                }
                '"' => in_quotes = false,
                _ => field.text.push(c),
            }
            continue;
        }
        match c {
            '"' if field.text.is_empty() && !field.quoted => {
                in_quotes = true;
                field.quoted = true;
            }
            '\r' => {}
            '\n' => {
                if !(record.is_empty() && field.text.is_empty() && !field.quoted) {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
            }
            c if c == delim => record.push(std::mem::take(&mut field)),
            _ => field.text.push(c),
        }
    }
    if in_quotes {
        return Err(WeaveError::MalformedTable("unterminated quoted field".to_string()));
    }
    if !(record.is_empty() && field.text.is_empty() && !field.quoted) {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}
