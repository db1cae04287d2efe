use crate::{Error, Result};

/// A single cell of a [`Dataset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    List(Vec<String>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text content, with missing and list cells read as the empty string.
    pub fn text_or_empty(&self) -> &str {
        self.as_text().unwrap_or("")
    }

    /// Flat string form used for CSV output. Lists are joined with `sep`.
    pub fn render(&self, sep: &str) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::List(items) => items.join(sep),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

/// Tabular post data with explicitly named columns.
///
/// Every row has exactly one cell per column. Columns are looked up by name
/// and a missing name is a configuration error, never a silent default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut data = Self::default();
        for column in columns {
            let column = column.into();
            if data.has_column(&column) {
                return Err(Error::DuplicateColumn { column });
            }
            data.columns.push(column);
        }
        Ok(data)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Index of `name`, or [`Error::MissingColumn`].
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| Error::MissingColumn { column: name.to_string() })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::RowWidth { expected: self.columns.len(), found: row.len() });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cell at (`row`, `column`); `None` when either is out of range.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.position(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Appends a column. `values` must hold one cell per row.
    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Result<Self> {
        if self.has_column(name) {
            return Err(Error::DuplicateColumn { column: name.to_string() });
        }
        if values.len() != self.rows.len() {
            return Err(Error::RowWidth { expected: self.rows.len(), found: values.len() });
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(self)
    }

    /// Sets every cell of `name` to `value`, adding the column if needed.
    pub fn fill_column(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(col) => {
                for row in &mut self.rows {
                    row[col] = Value::from(value);
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(Value::from(value));
                }
            }
        }
    }

    /// New dataset holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: indices.iter().filter_map(|&i| self.rows.get(i).cloned()).collect(),
        }
    }

    pub(crate) fn set_cell(&mut self, row: usize, col: usize, value: Value) {
        self.rows[row][col] = value;
    }

    /// Stacks datasets vertically over the union of their columns.
    ///
    /// Columns keep first-seen order; cells a part does not have are `Null`.
    pub fn concat<I: IntoIterator<Item = Dataset>>(parts: I) -> Dataset {
        let parts: Vec<Dataset> = parts.into_iter().collect();
        let mut out = Dataset::default();
        for part in &parts {
            for column in &part.columns {
                if !out.has_column(column) {
                    out.columns.push(column.clone());
                }
            }
        }
        let width = out.columns.len();
        for part in parts {
            let targets: Vec<usize> = part
                .columns
                .iter()
                .filter_map(|c| out.position(c))
                .collect();
            for row in part.rows {
                let mut full = vec![Value::Null; width];
                for (value, &target) in row.into_iter().zip(&targets) {
                    full[target] = value;
                }
                out.rows.push(full);
            }
        }
        out
    }
}
