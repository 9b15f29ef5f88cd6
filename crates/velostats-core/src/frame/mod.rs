// =============================================================================
// Data Frames
// =============================================================================
//
// A deliberately small column-typed table: just enough to load a delimited
// race-results file and feed the summary, design and plotting code. This is
// not a general dataframe library.
//
// LOADING:
// --------
// Files arrive with unknown delimiters (exports use commas, semicolons or
// tabs depending on the tool and locale), so the reader sniffs the delimiter
// from the first lines before parsing. Column types are then inferred from
// the values: a column where every field parses as an integer is Int, every
// field as a float is Float, anything else is Str.
//
// CATEGORICALS:
// -------------
// There is no dedicated categorical column type. `factorize` turns any
// column into (sorted unique levels, per-row level codes), which is all the
// summaries and the design matrix need.
//
// =============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ndarray::Array1;

use crate::error::{Result, VeloStatsError};

/// Delimiters the reader will consider, in tie-break order.
const CANDIDATE_DELIMITERS: [u8; 5] = [b',', b';', b'\t', b'|', b' '];

/// A single typed column.
#[derive(Debug, Clone)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Str(Vec<String>),
}

impl Column {
    /// Short type name, printed in the dtypes listing.
    pub fn dtype(&self) -> &'static str {
        match self {
            Column::Float(_) => "f64",
            Column::Int(_) => "i64",
            Column::Str(_) => "str",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render one cell as a string (used for previews).
    pub fn cell(&self, row: usize) -> String {
        match self {
            Column::Float(v) => format!("{}", v[row]),
            Column::Int(v) => format!("{}", v[row]),
            Column::Str(v) => v[row].clone(),
        }
    }
}

/// An ordered collection of named columns with a common row count.
#[derive(Debug, Clone)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame from parallel name/column vectors.
    ///
    /// All columns must have the same length and names must be unique.
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(VeloStatsError::DimensionMismatch(format!(
                "{} names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        let mut seen = HashMap::new();
        for name in &names {
            if seen.insert(name.clone(), ()).is_some() {
                return Err(VeloStatsError::InvalidValue(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        for (name, col) in names.iter().zip(&columns) {
            if col.len() != n_rows {
                return Err(VeloStatsError::DimensionMismatch(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    col.len(),
                    n_rows
                )));
            }
        }
        Ok(Frame {
            names,
            columns,
            n_rows,
        })
    }

    /// Load a delimited text file, sniffing the delimiter automatically.
    pub fn read_delimited<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let delimiter = sniff_delimiter(&content)?;
        log::info!(
            "detected delimiter {:?} in {}",
            delimiter as char,
            path.as_ref().display()
        );

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let names: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        // Collect everything as strings first, then infer types per column.
        let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record?;
            for (j, field) in record.iter().enumerate() {
                raw[j].push(field.to_string());
            }
        }

        if raw.first().map(Vec::len).unwrap_or(0) == 0 {
            return Err(VeloStatsError::EmptyInput(
                "file has a header but no data rows".to_string(),
            ));
        }

        let columns = raw.into_iter().map(infer_column).collect::<Result<_>>()?;
        Frame::new(names, columns)
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// (column name, type name) pairs in column order.
    pub fn dtypes(&self) -> Vec<(&str, &'static str)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Column::dtype))
            .collect()
    }

    /// The first `n` rows, rendered as strings (for previews).
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        (0..n.min(self.n_rows))
            .map(|i| self.columns.iter().map(|c| c.cell(i)).collect())
            .collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| VeloStatsError::MissingColumn(name.to_string()))?;
        Ok(&self.columns[idx])
    }

    /// A column as f64 values. Int columns are widened; Str columns error.
    pub fn numeric(&self, name: &str) -> Result<Array1<f64>> {
        match self.column(name)? {
            Column::Float(v) => Ok(Array1::from_vec(v.clone())),
            Column::Int(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Column::Str(_) => Err(VeloStatsError::NotNumeric(name.to_string())),
        }
    }

    /// A column as strings, whatever its type.
    pub fn strings(&self, name: &str) -> Result<Vec<String>> {
        let col = self.column(name)?;
        Ok((0..self.n_rows).map(|i| col.cell(i)).collect())
    }

    /// Categorical encoding: sorted unique levels plus per-row level codes.
    ///
    /// Matches the (levels, codes) layout of `np.unique(return_inverse=True)`:
    /// numeric columns sort their levels by value, string columns lexically.
    /// A stage category column holding 1, 2 and 10 therefore gets the level
    /// order 1 < 2 < 10, not the lexical 1 < 10 < 2.
    pub fn factorize(&self, name: &str) -> Result<(Vec<String>, Vec<usize>)> {
        let levels: Vec<String> = match self.column(name)? {
            Column::Int(v) => {
                let mut uniq = v.clone();
                uniq.sort_unstable();
                uniq.dedup();
                uniq.iter().map(|x| x.to_string()).collect()
            }
            Column::Float(v) => {
                let mut sorted = v.clone();
                sorted.sort_by(f64::total_cmp);
                let mut uniq: Vec<String> = sorted.iter().map(|x| x.to_string()).collect();
                uniq.dedup();
                uniq
            }
            Column::Str(v) => {
                let mut uniq = v.clone();
                uniq.sort();
                uniq.dedup();
                uniq
            }
        };

        let index: HashMap<&str, usize> = levels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();
        let values = self.strings(name)?;
        let codes = values.iter().map(|v| index[v.as_str()]).collect();
        Ok((levels, codes))
    }
}

/// Pick the delimiter that splits the first lines into the most fields,
/// consistently across header and first data row.
fn sniff_delimiter(content: &str) -> Result<u8> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| VeloStatsError::EmptyInput("file is empty".to_string()))?;
    let first_row = lines.next();

    let mut best: Option<(u8, usize)> = None;
    for &cand in &CANDIDATE_DELIMITERS {
        let sep = cand as char;
        let header_fields = header.split(sep).count();
        if header_fields < 2 {
            continue;
        }
        // A real delimiter splits the data row into the same number of fields.
        if let Some(row) = first_row {
            if row.split(sep).count() != header_fields {
                continue;
            }
        }
        if best.map(|(_, n)| header_fields > n).unwrap_or(true) {
            best = Some((cand, header_fields));
        }
    }

    best.map(|(d, _)| d).ok_or_else(|| {
        VeloStatsError::InvalidValue("could not detect a field delimiter".to_string())
    })
}

/// Infer the narrowest type that fits every value in the column.
fn infer_column(values: Vec<String>) -> Result<Column> {
    if values.iter().any(|v| v.is_empty()) {
        return Err(VeloStatsError::InvalidValue(
            "empty field in data row".to_string(),
        ));
    }
    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return Ok(Column::Int(
            values.iter().map(|v| v.parse().unwrap()).collect(),
        ));
    }
    if values.iter().all(|v| v.parse::<f64>().is_ok()) {
        return Ok(Column::Float(
            values.iter().map(|v| v.parse().unwrap()).collect(),
        ));
    }
    Ok(Column::Str(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_read_comma_delimited() {
        let f = write_file("rider_class,stage_class,points\nsprinter,flat,50\nclimber,mountain,12\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        assert_eq!(frame.shape(), (2, 3));
        assert_eq!(
            frame.dtypes(),
            vec![("rider_class", "str"), ("stage_class", "str"), ("points", "i64")]
        );
    }

    #[test]
    fn test_read_semicolon_delimited() {
        let f = write_file("a;b\n1;2.5\n3;4.5\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(frame.dtypes(), vec![("a", "i64"), ("b", "f64")]);
    }

    #[test]
    fn test_read_tab_delimited() {
        let f = write_file("a\tb\n1\tx\n2\ty\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        assert_eq!(frame.dtypes(), vec![("a", "i64"), ("b", "str")]);
    }

    #[test]
    fn test_header_only_is_empty_input() {
        let f = write_file("a,b\n");
        let err = Frame::read_delimited(f.path()).unwrap_err();
        assert!(matches!(err, VeloStatsError::EmptyInput(_)));
    }

    #[test]
    fn test_single_column_has_no_delimiter() {
        let f = write_file("points\n10\n25\n");
        assert!(Frame::read_delimited(f.path()).is_err());
    }

    #[test]
    fn test_numeric_and_strings() {
        let f = write_file("cls,points\na,10\nb,25\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        let pts = frame.numeric("points").unwrap();
        assert_eq!(pts.to_vec(), vec![10.0, 25.0]);
        assert!(frame.numeric("cls").is_err());
        assert_eq!(frame.strings("cls").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_column() {
        let f = write_file("a,b\n1,2\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        assert!(matches!(
            frame.numeric("c").unwrap_err(),
            VeloStatsError::MissingColumn(_)
        ));
    }

    #[test]
    fn test_factorize_sorts_levels() {
        let f = write_file("cls,points\nsprinter,1\nclimber,2\nsprinter,3\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        let (levels, codes) = frame.factorize("cls").unwrap();
        assert_eq!(levels, vec!["climber", "sprinter"]);
        assert_eq!(codes, vec![1, 0, 1]);
    }

    #[test]
    fn test_factorize_numeric_levels_sort_by_value() {
        let f = write_file("stage_class,points\n2,5\n10,7\n1,3\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        let (levels, codes) = frame.factorize("stage_class").unwrap();
        assert_eq!(levels, vec!["1", "2", "10"]);
        assert_eq!(codes, vec![1, 2, 0]);
    }

    #[test]
    fn test_factorize_float_levels_sort_by_value() {
        let f = write_file("grade,points\n7.5,3\n10.5,4\n2.5,1\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        let (levels, codes) = frame.factorize("grade").unwrap();
        assert_eq!(levels, vec!["2.5", "7.5", "10.5"]);
        assert_eq!(codes, vec![1, 2, 0]);
    }

    #[test]
    fn test_head_renders_strings() {
        let f = write_file("cls,points\na,1.5\nb,2\nc,3\n");
        let frame = Frame::read_delimited(f.path()).unwrap();
        let head = frame.head(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head[0], vec!["a", "1.5"]);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let names = vec!["a".to_string(), "a".to_string()];
        let cols = vec![Column::Int(vec![1]), Column::Int(vec![2])];
        assert!(Frame::new(names, cols).is_err());
    }
}
