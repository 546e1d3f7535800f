use csv::ReaderBuilder;
use nalgebra::DMatrix;
use std::fmt::{self, Display, Formatter};
use std::io::Read;
use std::path::Path;

use crate::data::dataset::RealNumber;
use crate::error::RegressionError;

/// Dense, growable feature matrix.
///
/// Rows and columns can be appended or truncated; every accessor is bounds-checked
/// and reports `IndexOutOfRange` instead of panicking.
#[derive(Clone, Debug, PartialEq)]
pub struct Table<T: RealNumber> {
    data: DMatrix<T>,
}

impl<T: RealNumber> Default for Table<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: RealNumber> Table<T> {
    /// Creates an empty table with a fixed number of columns.
    pub fn new(ncols: usize) -> Self {
        Self {
            data: DMatrix::zeros(0, ncols),
        }
    }

    pub fn from_matrix(data: DMatrix<T>) -> Self {
        Self { data }
    }

    /// Builds a table from row-major values.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `values.len() != nrows * ncols`.
    pub fn from_row_slice(nrows: usize, ncols: usize, values: &[T]) -> Result<Self, RegressionError> {
        if values.len() != nrows * ncols {
            return Err(RegressionError::DimensionMismatch(format!(
                "{} values cannot fill a {}x{} table",
                values.len(),
                nrows,
                ncols
            )));
        }
        Ok(Self {
            data: DMatrix::from_row_slice(nrows, ncols, values),
        })
    }

    /// Loads a CSV file whose first line names the columns.
    ///
    /// # Arguments
    ///
    /// * `path` - The CSV file.
    /// * `ignored_columns` - Header names of columns to drop, e.g. a date column.
    ///
    /// # Errors
    ///
    /// `Csv` if the file cannot be read, `InvalidValue` for a cell that is not a number
    /// and `InvalidConfiguration` if every column would be ignored.
    pub fn from_path<P: AsRef<Path>>(path: P, ignored_columns: &[&str]) -> Result<Self, RegressionError> {
        let reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
        Self::from_csv(reader, ignored_columns)
    }

    /// Same as [`Table::from_path`] for any byte source.
    pub fn from_reader<R: Read>(source: R, ignored_columns: &[&str]) -> Result<Self, RegressionError> {
        let reader = ReaderBuilder::new().has_headers(true).from_reader(source);
        Self::from_csv(reader, ignored_columns)
    }

    fn from_csv<R: Read>(
        mut reader: csv::Reader<R>,
        ignored_columns: &[&str],
    ) -> Result<Self, RegressionError> {
        let kept = reader
            .headers()?
            .iter()
            .enumerate()
            .filter(|(_, name)| !ignored_columns.contains(name))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        if kept.is_empty() {
            return Err(RegressionError::InvalidConfiguration(
                "every column of the table is ignored".into(),
            ));
        }

        let mut values = Vec::new();
        let mut nrows = 0;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            for &column in &kept {
                let raw = record.get(column).unwrap_or_default();
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(T::from_f64)
                    .ok_or_else(|| RegressionError::InvalidValue {
                        row,
                        column,
                        value: raw.to_string(),
                    })?;
                values.push(value);
            }
            nrows += 1;
        }

        Self::from_row_slice(nrows, kept.len(), &values)
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_matrix(&self) -> &DMatrix<T> {
        &self.data
    }

    pub fn into_matrix(self) -> DMatrix<T> {
        self.data
    }

    pub fn get(&self, row: usize, column: usize) -> Result<T, RegressionError> {
        self.check_row(row)?;
        self.check_column(column)?;
        Ok(self.data[(row, column)])
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) -> Result<(), RegressionError> {
        self.check_row(row)?;
        self.check_column(column)?;
        self.data[(row, column)] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Result<Vec<T>, RegressionError> {
        self.check_row(row)?;
        Ok(self.data.row(row).iter().copied().collect())
    }

    pub fn column(&self, column: usize) -> Result<Vec<T>, RegressionError> {
        self.check_column(column)?;
        Ok(self.data.column(column).iter().copied().collect())
    }

    /// Appends a row at the bottom of the table.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the row width differs from the column count.
    pub fn push_row(&mut self, row: &[T]) -> Result<(), RegressionError> {
        if row.len() != self.ncols() {
            return Err(RegressionError::DimensionMismatch(format!(
                "row has {} values, table has {} columns",
                row.len(),
                self.ncols()
            )));
        }
        let nrows = self.nrows();
        let data = std::mem::replace(&mut self.data, DMatrix::zeros(0, 0));
        let mut data = data.insert_row(nrows, T::zero());
        for (j, &value) in row.iter().enumerate() {
            data[(nrows, j)] = value;
        }
        self.data = data;
        Ok(())
    }

    /// Appends a column at the right of the table.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the column length differs from the row count.
    pub fn push_column(&mut self, column: &[T]) -> Result<(), RegressionError> {
        if column.len() != self.nrows() {
            return Err(RegressionError::DimensionMismatch(format!(
                "column has {} values, table has {} rows",
                column.len(),
                self.nrows()
            )));
        }
        let ncols = self.ncols();
        let data = std::mem::replace(&mut self.data, DMatrix::zeros(0, 0));
        let mut data = data.insert_column(ncols, T::zero());
        data.column_mut(ncols).copy_from_slice(column);
        self.data = data;
        Ok(())
    }

    /// Truncates to `nrows` rows, or pads with zero rows.
    pub fn set_nrows(&mut self, nrows: usize) {
        self.resize(nrows, self.ncols());
    }

    /// Truncates to the leading `ncols` columns, or pads with zero columns.
    pub fn set_ncols(&mut self, ncols: usize) {
        self.resize(self.nrows(), ncols);
    }

    fn resize(&mut self, nrows: usize, ncols: usize) {
        let old = &self.data;
        self.data = DMatrix::from_fn(nrows, ncols, |i, j| {
            if i < old.nrows() && j < old.ncols() {
                old[(i, j)]
            } else {
                T::zero()
            }
        });
    }

    fn check_row(&self, row: usize) -> Result<(), RegressionError> {
        if row >= self.nrows() {
            return Err(RegressionError::IndexOutOfRange {
                what: "row",
                index: row,
                len: self.nrows(),
            });
        }
        Ok(())
    }

    fn check_column(&self, column: usize) -> Result<(), RegressionError> {
        if column >= self.ncols() {
            return Err(RegressionError::IndexOutOfRange {
                what: "column",
                index: column,
                len: self.ncols(),
            });
        }
        Ok(())
    }
}

impl<T: RealNumber> Display for Table<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.data.row_iter() {
            for value in row.iter() {
                write!(f, "{}\t", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table<f64> {
        Table::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn test_from_row_slice_wrong_length() {
        let result = Table::from_row_slice(2, 2, &[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(RegressionError::DimensionMismatch(_))));
    }

    #[test]
    fn test_row_and_column_access() {
        let table = table();
        assert_eq!(table.row(1).unwrap(), vec![4.0, 5.0, 6.0]);
        assert_eq!(table.column(2).unwrap(), vec![3.0, 6.0]);
        assert_eq!(table.get(0, 1).unwrap(), 2.0);
    }

    #[test]
    fn test_out_of_range_access() {
        let table = table();
        assert!(matches!(
            table.row(2),
            Err(RegressionError::IndexOutOfRange { what: "row", index: 2, len: 2 })
        ));
        assert!(matches!(
            table.get(0, 3),
            Err(RegressionError::IndexOutOfRange { what: "column", .. })
        ));
    }

    #[test]
    fn test_set_value() {
        let mut table = table();
        table.set(1, 0, 40.0).unwrap();
        assert_eq!(table.get(1, 0).unwrap(), 40.0);
        assert!(table.set(5, 0, 1.0).is_err());
    }

    #[test]
    fn test_push_row() {
        let mut table = Table::new(2);
        table.push_row(&[1.0, 2.0]).unwrap();
        table.push_row(&[3.0, 4.0]).unwrap();
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.row(1).unwrap(), vec![3.0, 4.0]);

        let result = table.push_row(&[1.0]);
        assert!(matches!(result, Err(RegressionError::DimensionMismatch(_))));
    }

    #[test]
    fn test_push_column() {
        let mut table = table();
        table.push_column(&[7.0, 8.0]).unwrap();
        assert_eq!(table.ncols(), 4);
        assert_eq!(table.row(0).unwrap(), vec![1.0, 2.0, 3.0, 7.0]);
        assert!(table.push_column(&[1.0]).is_err());
    }

    #[test]
    fn test_push_keeps_existing_cells() {
        let mut table = table();
        table.push_row(&[7.0, 8.0, 9.0]).unwrap();
        table.push_column(&[-1.0, -2.0, -3.0]).unwrap();
        assert_eq!(table.nrows(), 3);
        assert_eq!(table.ncols(), 4);
        assert_eq!(table.row(0).unwrap(), vec![1.0, 2.0, 3.0, -1.0]);
        assert_eq!(table.row(1).unwrap(), vec![4.0, 5.0, 6.0, -2.0]);
        assert_eq!(table.row(2).unwrap(), vec![7.0, 8.0, 9.0, -3.0]);
        assert_eq!(table.column(3).unwrap(), vec![-1.0, -2.0, -3.0]);

        let mut empty = Table::<f64>::new(0);
        empty.push_column(&[]).unwrap();
        assert_eq!(empty.ncols(), 1);
        empty.push_row(&[5.0]).unwrap();
        assert_eq!(empty.get(0, 0).unwrap(), 5.0);
    }

    #[test]
    fn test_set_ncols_truncates_and_pads() {
        let mut table = table();
        table.set_ncols(2);
        assert_eq!(table.row(1).unwrap(), vec![4.0, 5.0]);
        table.set_ncols(3);
        assert_eq!(table.row(1).unwrap(), vec![4.0, 5.0, 0.0]);
    }

    #[test]
    fn test_set_nrows_truncates_and_pads() {
        let mut table = table();
        table.set_nrows(1);
        assert_eq!(table.nrows(), 1);
        table.set_nrows(3);
        assert_eq!(table.row(2).unwrap(), vec![0.0, 0.0, 0.0]);
        assert_eq!(table.row(0).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_reader_skips_ignored_columns() {
        let csv = "Date,Temp,Rain\n1981-01-01,20.7,0.5\n1981-01-02,17.9,0.0\n";
        let table: Table<f64> = Table::from_reader(csv.as_bytes(), &["Date"]).unwrap();
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.ncols(), 2);
        assert_eq!(table.row(1).unwrap(), vec![17.9, 0.0]);
    }

    #[test]
    fn test_from_reader_invalid_value() {
        let csv = "Temp\n20.7\nabc\n";
        let result: Result<Table<f64>, _> = Table::from_reader(csv.as_bytes(), &[]);
        assert!(matches!(
            result,
            Err(RegressionError::InvalidValue { row: 1, column: 0, .. })
        ));
    }

    #[test]
    fn test_from_reader_all_ignored() {
        let csv = "Date\n1981-01-01\n";
        let result: Result<Table<f64>, _> = Table::from_reader(csv.as_bytes(), &["Date"]);
        assert!(matches!(
            result,
            Err(RegressionError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_display() {
        let table = Table::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(format!("{}", table), "1\t2\t\n3\t4\t\n");
    }
}
