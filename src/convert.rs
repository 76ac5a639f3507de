//! CSV → safetensors conversion of exported session files.
//!
//! The operant boxes and the imaging rigs export CSV.  [`convert_csv_dir`]
//! mirrors a directory tree of such exports into safetensors tables that the
//! [`load`](crate::load) helpers read.
//!
//! Cell parsing:
//!
//! ```text
//! "0.25", "-3", "1e-3"      → number
//! "True"/"true"/"TRUE"      → 1.0
//! "False"/"false"/"FALSE"   → 0.0
//! ""  "nan"  "NaN"          → NaN
//! anything else             → the whole column is dropped
//! ```
use anyhow::{bail, Context, Result};
use ndarray::Array1;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::io::write_table;
use crate::table::Table;

/// CSV reader settings.
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Field delimiter.  Default: `,`.
    pub delimiter: u8,
    /// Extension of the files to convert.  Default: `"csv"`.
    pub extension: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            extension: "csv".into(),
        }
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    match cell {
        "" => Some(f64::NAN),
        "True" | "true" | "TRUE" => Some(1.0),
        "False" | "false" | "FALSE" => Some(0.0),
        _ => cell.parse::<f64>().ok(),
    }
}

/// Parse CSV text with a header row into a table.
///
/// Columns containing a cell that is neither numeric, boolean nor empty are
/// dropped with a warning.
pub fn parse_csv<R: Read>(reader: R, cfg: &CsvConfig) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(cfg.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    let mut numeric = vec![true; headers.len()];
    for (row_idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("CSV row {}", row_idx + 1))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {}: expected {} fields, got {}",
                row_idx + 1,
                headers.len(),
                record.len()
            );
        }
        for (col, cell) in record.iter().enumerate() {
            if !numeric[col] {
                continue;
            }
            match parse_cell(cell) {
                Some(v) => values[col].push(v),
                None => numeric[col] = false,
            }
        }
    }

    let mut table = Table::new();
    for ((name, column), keep) in headers.into_iter().zip(values).zip(numeric) {
        if keep {
            table.push_column(name, Array1::from(column))?;
        } else {
            warn!(column = %name, "dropping non-numeric column");
        }
    }
    Ok(table)
}

/// Convert one CSV file to a safetensors table.
pub fn convert_csv_file(input: &Path, output: &Path, cfg: &CsvConfig) -> Result<()> {
    let file = std::fs::File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let table = parse_csv(std::io::BufReader::new(file), cfg)
        .with_context(|| format!("parsing {}", input.display()))?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    write_table(&table, output)
}

fn collect_files(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_files(&path, extension, out)?;
        } else if path.extension().is_some_and(|e| e == extension) {
            out.push(path);
        }
    }
    Ok(())
}

/// Convert every CSV file below `input_dir` into a `.safetensors` table at the
/// same relative path below `output_dir`.  Returns the number of files
/// written.
pub fn convert_csv_dir(input_dir: &Path, output_dir: &Path, cfg: &CsvConfig) -> Result<usize> {
    let mut files = Vec::new();
    collect_files(input_dir, &cfg.extension, &mut files)?;

    for input in &files {
        let relative = input.strip_prefix(input_dir)?;
        let output = output_dir.join(relative).with_extension("safetensors");
        convert_csv_file(input, &output, cfg)?;
        info!(from = %input.display(), to = %output.display(), "converted");
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_booleans_and_blanks() {
        let data = "trial_idx,chose_large,start_time\n0,True,1.5\n1,False,\n";
        let t = parse_csv(data.as_bytes(), &CsvConfig::default()).unwrap();
        assert_eq!(t.names(), &["trial_idx", "chose_large", "start_time"]);
        assert_eq!(t.column("chose_large").unwrap().to_vec(), vec![1.0, 0.0]);
        assert!(t.column("start_time").unwrap()[1].is_nan());
    }

    #[test]
    fn drops_text_columns() {
        let data = "time,label\n0.1,lever\n0.2,nose\n";
        let t = parse_csv(data.as_bytes(), &CsvConfig::default()).unwrap();
        assert_eq!(t.names(), &["time"]);
        assert_eq!(t.n_rows(), 2);
    }

    #[test]
    fn ragged_rows_are_an_error() {
        let data = "a,b\n1,2\n3\n";
        assert!(parse_csv(data.as_bytes(), &CsvConfig::default()).is_err());
    }

    #[test]
    fn tab_delimited() {
        let cfg = CsvConfig { delimiter: b'\t', ..Default::default() };
        let t = parse_csv("a\tb\n1\t2\n".as_bytes(), &cfg).unwrap();
        assert_eq!(t.column("b").unwrap().to_vec(), vec![2.0]);
    }
}
