use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::model::RvDataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Where the RV measurements come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// One file with a 4th column holding the integer instrument index.
    Combined(PathBuf),
    /// One file per instrument, three columns each; the instrument index is
    /// the 1-based position in the list.
    Separate(Vec<PathBuf>),
}

/// Load RV data after skipping `skip` header lines in every file.
///
/// Columns are `time  velocity  uncertainty [instrument]`, whitespace
/// separated. Blank lines and `#` comments are ignored; extra columns are
/// ignored too.
pub fn read_datafile(source: &DataSource, skip: usize) -> Result<RvDataset> {
    let mut dataset = RvDataset::default();

    match source {
        DataSource::Combined(path) => {
            let table = TextTable::open(path)?;
            for row in table.rows(skip, 4)? {
                let instrument = parse_instrument(row.fields[3])
                    .with_context(|| format!("{}:{}", path.display(), row.line))?;
                dataset.push(
                    parse_f64(row.fields[0], path, row.line)?,
                    parse_f64(row.fields[1], path, row.line)?,
                    parse_f64(row.fields[2], path, row.line)?,
                    instrument,
                );
            }
        }
        DataSource::Separate(paths) => {
            if paths.is_empty() {
                bail!("No data files given");
            }
            for (i, path) in paths.iter().enumerate() {
                let instrument = (i + 1) as u32;
                let table = TextTable::open(path)?;
                for row in table.rows(skip, 3)? {
                    dataset.push(
                        parse_f64(row.fields[0], path, row.line)?,
                        parse_f64(row.fields[1], path, row.line)?,
                        parse_f64(row.fields[2], path, row.line)?,
                        instrument,
                    );
                }
            }
        }
    }

    log::info!(
        "Loaded {} RV measurements from {} instrument(s)",
        dataset.len(),
        dataset.instruments().len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Whitespace-delimited tables
// ---------------------------------------------------------------------------

/// One non-empty, non-comment line split on whitespace.
pub struct TableRow<'a> {
    /// 1-based line number in the file.
    pub line: usize,
    pub fields: Vec<&'a str>,
}

/// Owned file contents with helpers to iterate its data rows.
pub struct TextTable {
    path: PathBuf,
    text: String,
}

impl TextTable {
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(TextTable {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Data rows after the first `skip` lines, each with at least `min_cols`
    /// fields.
    pub fn rows(&self, skip: usize, min_cols: usize) -> Result<Vec<TableRow<'_>>> {
        let mut rows = Vec::new();
        for (i, line) in self.text.lines().enumerate().skip(skip) {
            let content = line.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let fields: Vec<&str> = content.split_whitespace().collect();
            if fields.len() < min_cols {
                bail!(
                    "{}:{}: expected at least {min_cols} columns, found {}",
                    self.path.display(),
                    i + 1,
                    fields.len()
                );
            }
            rows.push(TableRow { line: i + 1, fields });
        }
        Ok(rows)
    }
}

/// Read all numeric rows of `path` as `f64`, requiring `min_cols` columns.
pub fn read_numeric_table(path: &Path, skip: usize, min_cols: usize) -> Result<Vec<Vec<f64>>> {
    let table = TextTable::open(path)?;
    table
        .rows(skip, min_cols)?
        .into_iter()
        .map(|row| {
            row.fields
                .iter()
                .map(|f| parse_f64(f, path, row.line))
                .collect()
        })
        .collect()
}

fn parse_f64(field: &str, path: &Path, line: usize) -> Result<f64> {
    field
        .parse::<f64>()
        .with_context(|| format!("{}:{line}: '{field}' is not a number", path.display()))
}

/// Instrument indices are written as integers, sometimes with a trailing `.0`.
fn parse_instrument(field: &str) -> Result<u32> {
    let value: f64 = field
        .parse()
        .with_context(|| format!("'{field}' is not an instrument index"))?;
    if value.fract() != 0.0 || value < 1.0 {
        bail!("'{field}' is not a positive integer instrument index");
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn rows(n: usize, offset: f64) -> String {
        let mut s = String::from("time vrad svrad\n---- ---- -----\n");
        for i in 0..n {
            s.push_str(&format!("{} {} 0.5\n", i as f64 + offset, (i as f64) * 10.0 + offset));
        }
        s
    }

    #[test]
    fn separate_files_get_positional_indices() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", &rows(5, 100.0));
        let b = write_file(dir.path(), "b.txt", &rows(3, 200.0));
        let c = write_file(dir.path(), "c.txt", &rows(7, 300.0));

        let ds = read_datafile(&DataSource::Separate(vec![a, b, c]), 2).unwrap();
        assert_eq!(ds.len(), 15);
        assert_eq!(ds.instrument.len(), 15);
        assert!(ds.instrument[..5].iter().all(|&i| i == 1));
        assert!(ds.instrument[5..8].iter().all(|&i| i == 2));
        assert!(ds.instrument[8..].iter().all(|&i| i == 3));
        assert_eq!(ds.velocity[0], 100.0);
        assert_eq!(ds.velocity[5], 200.0);
        assert_eq!(ds.velocity[8], 300.0);
        assert_eq!(ds.velocity[14], 360.0);
    }

    #[test]
    fn combined_file_reads_fourth_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "full.txt",
            "# time\tvrad\tsvrad\n# ----\t----\t-----\n\
             57395.856817 7.33907 0.00814 2\n\
             57396.000000 7.30000 0.00900 1\n\n",
        );
        let ds = read_datafile(&DataSource::Combined(path), 0).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.instrument, vec![2, 1]);
        assert_eq!(ds.time[0], 57395.856817);
    }

    #[test]
    fn combined_file_without_instrument_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "three.txt", "1.0 2.0 3.0\n");
        let err = read_datafile(&DataSource::Combined(path), 0).unwrap_err();
        assert!(format!("{err:#}").contains("expected at least 4 columns"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_datafile(
            &DataSource::Separate(vec![PathBuf::from("/nonexistent/rv.txt")]),
            0,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/rv.txt"));
    }

    #[test]
    fn malformed_value_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.txt", "1.0 2.0 3.0\n1.0 x 3.0\n");
        let err = read_datafile(&DataSource::Separate(vec![path]), 0).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains(":2:") && msg.contains("'x'"), "{msg}");
    }
}
