//! Create and write a row-based [`Table`].

use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::PartialEq;
use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A row-based [`Table`] of generic data.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Table<T> {
    /// Names of the table columns.
    pub headers: Vec<T>,
    /// Rows of table values.
    pub rows: Vec<Vec<T>>,
    /// Optional file path for where the table was written to.
    pub path: Option<PathBuf>,
}

impl<T> Default for Table<T>
where
    T: Clone + Display + Debug + PartialEq<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Table<T>
where
    T: Clone + Display + Debug + PartialEq<T>,
{
    /// Returns a new row-based [`Table`] with empty headers and rows.
    ///
    /// ## Examples
    ///
    /// Let the compiler figure out the type from subsequent commands.
    ///
    /// ```
    /// let mut table = phyloacc_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(vec!["A", "B", "C"]);
    /// # assert_eq!(table.rows, vec![vec!["A", "B", "C"]]);
    /// ```
    ///
    /// | 1 | 2 | 3 |
    /// |---|---|---|
    /// | A | B | C |
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new(), path: None }
    }

    /// Add a new row to the table.
    ///
    /// ## Arguments
    ///
    /// * `row` - A iterable object of new data (`T`) to add as a row.
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table = phyloacc_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    /// table.add_row(["D", "E", "F"])?;
    /// assert!(table.add_row(["G", "H"]).is_err());
    /// # assert_eq!(table.rows, [["A", "B", "C"], ["D", "E", "F"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// | 1 | 2 | 3 |
    /// |---|---|---|
    /// | A | B | C |
    /// | D | E | F |
    ///
    pub fn add_row<I>(&mut self, row: I) -> Result<(), Report>
    where
        I: IntoIterator<Item = T>,
    {
        let row = row.into_iter().collect::<Vec<T>>();
        // check the new row against the headers, or the existing rows if there are no headers
        let ex = match self.headers.is_empty() {
            true => self.rows.first().map(|r| r.len()),
            false => Some(self.headers.len()),
        };
        if let Some(ex) = ex {
            let new = row.len();
            if ex != new {
                return Err(eyre!("New row size ({new}) does not matching existing table ({ex})."));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns the [`Table`] value under a particular header and row index.
    ///
    /// ```
    /// let mut table = phyloacc_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    ///
    /// assert_eq!(table.get(&"2", 0)?, &"B");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get(&self, header: &T, row: usize) -> Result<&T, Report> {
        let header_i = self.get_header_index(header)?;
        let row = self
            .rows
            .get(row)
            .ok_or_else(|| eyre!("Row ({row}) does not exist in the table."))?;
        Ok(&row[header_i])
    }

    /// Returns a [`Vec`] of [`Table`] values under a header.
    pub fn get_column(&self, header: &T) -> Result<Vec<&T>, Report> {
        let header_i = self.get_header_index(header)?;
        let column = self.rows.iter().map(|row| &row[header_i]).collect();
        Ok(column)
    }

    /// Returns the column index (0-based) of the header in the [`Table`].
    pub fn get_header_index(&self, header: &T) -> Result<usize, Report> {
        let pos =
            self.headers.iter().position(|h| h == header).ok_or_else(|| {
                eyre!("Column '{header}' was not found in table: {:?}.", self.path)
            })?;

        Ok(pos)
    }

    /// Convert the [`Table`] to a markdown string, used for log output.
    ///
    /// ```
    /// let mut table = phyloacc_table::Table::new();
    /// table.headers = vec!["node", "sCF"];
    /// table.add_row(["<1>", "0.75"])?;
    /// assert_eq!(table.to_markdown(), "| node | sCF  |\n|------|------|\n| <1>  | 0.75 |\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn to_markdown(&self) -> String {
        // widest cell in every column, headers included
        let widths = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.to_string().len())
                    .chain([header.to_string().len()])
                    .max()
                    .unwrap_or_default()
            })
            .collect_vec();

        let line = |cells: Vec<String>| {
            let cells =
                cells.iter().zip(&widths).map(|(c, w)| format!(" {c:<w$} ", w = *w)).join("|");
            format!("|{cells}|\n")
        };

        let mut markdown = line(self.headers.iter().map(|h| h.to_string()).collect());
        let frame = widths.iter().map(|w| "-".repeat(w + 2)).join("|");
        markdown.push_str(&format!("|{frame}|\n"));
        for row in &self.rows {
            markdown.push_str(&line(row.iter().map(|c| c.to_string()).collect()));
        }
        markdown
    }

    /// Write [`Table`] to file [`Path`].
    ///
    /// If `delim` is [`None`], the delimiter is chosen from the file extension with
    /// [`get_delimiter`]. Values that contain the delimiter, a quote or a newline are
    /// double-quoted, with inner quotes doubled.
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table = phyloacc_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("table.csv");
    /// table.write(&path, None)?;
    /// assert_eq!(std::fs::read_to_string(&path)?, "1,2,3\nA,B,C\n");
    ///
    /// table.add_row(["D,E", "\"F\"", "G"])?;
    /// table.write(&path, None)?;
    /// assert_eq!(std::fs::read_to_string(&path)?, "1,2,3\nA,B,C\n\"D,E\",\"\"\"F\"\"\",G\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<P>(&mut self, path: &P, delim: Option<char>) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        // if not provided, lookup delimiter from file extension
        let delim = match delim {
            Some(c) => c,
            None => get_delimiter(path)?,
        }
        .to_string();

        let mut file =
            File::create(path).wrap_err_with(|| eyre!("Unable to create file: {path:?}"))?;

        let to_line = |values: &[T]| {
            let values = values.iter().map(|v| quote(&v.to_string(), &delim)).join(&delim);
            format!("{values}\n")
        };

        // write headers
        let line = to_line(&self.headers);
        file.write_all(line.as_bytes())
            .wrap_err_with(|| eyre!("Unable to write table headers: {line}"))?;

        // write regular rows
        self.rows.iter().try_for_each(|row| {
            let line = to_line(row);
            file.write_all(line.as_bytes())
                .wrap_err_with(|| format!("Unable to write table rows: {line}"))?;
            Ok::<(), Report>(())
        })?;

        self.path = Some(path.as_ref().to_path_buf());
        Ok(())
    }
}

/// Double-quote a delimited value if it contains the delimiter, a quote or a newline.
fn quote(value: &str, delim: &str) -> String {
    match value.contains(delim) || value.contains(['"', '\n', '\r']) {
        true => format!("\"{}\"", value.replace('"', "\"\"")),
        false => value.to_string(),
    }
}

/// Get delimiter based on file extension.
///
/// - `.tsv` => `\t`
/// - `.txt` => `\t`
/// - `.csv` => `,`
///
/// ```rust
/// use phyloacc_table::get_delimiter;
///
/// assert_eq!(get_delimiter(&"file.tsv")?, '\t');
/// assert_eq!(get_delimiter(&"file.csv")?, ',');
/// assert_eq!(get_delimiter(&"file.txt")?, '\t');
/// assert!(get_delimiter(&"file").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn get_delimiter<P>(path: &P) -> Result<char, Report>
where
    P: AsRef<Path> + Debug,
{
    let ext = path
        .as_ref()
        .extension()
        .wrap_err_with(|| format!("Failed to get file extension: {path:?}"))?
        .to_str()
        .wrap_err_with(|| format!("Failed to convert file extension to str: {path:?}"))?;
    // convert extension to the expected delimiter
    match ext {
        "tsv" | "txt" => Ok('\t'),
        "csv" => Ok(','),
        _ext => Err(eyre!("Unknown file extension: {_ext:?}, options: tsv, csv, or txt")),
    }
}
