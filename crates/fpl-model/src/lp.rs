//! Canonical linear-problem form.
//!
//! The model builder emits into this structure and solver backends consume
//! it; nothing downstream sees the builder's variable families. Columns and
//! rows are stored densely in emission order so a primal vector indexes
//! directly by column.

/// Column integrality class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColKind {
    Continuous,
    Integer,
    Binary,
}

/// One decision variable.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub kind: ColKind,
    pub lower: f64,
    pub upper: f64,
    /// Objective coefficient.
    pub objective: f64,
}

/// One linear constraint: `lower <= Σ coeff·x <= upper`.
///
/// Equalities set `lower == upper`; one-sided rows use infinities.
#[derive(Debug, Clone)]
pub struct Row {
    pub lower: f64,
    pub upper: f64,
    /// Sparse coefficients as (column index, coefficient), sorted by column
    /// with duplicates combined.
    pub coeffs: Vec<(usize, f64)>,
}

/// A full problem instance.
#[derive(Debug, Clone)]
pub struct LinearProblem {
    pub maximise: bool,
    cols: Vec<Column>,
    rows: Vec<Row>,
}

impl LinearProblem {
    pub fn maximisation() -> Self {
        Self {
            maximise: true,
            cols: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> &[Column] {
        &self.cols
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn add_col(&mut self, kind: ColKind, lower: f64, upper: f64) -> usize {
        debug_assert!(lower <= upper, "column bounds inverted");
        self.cols.push(Column {
            kind,
            lower,
            upper,
            objective: 0.0,
        });
        self.cols.len() - 1
    }

    pub fn add_binary(&mut self) -> usize {
        self.add_col(ColKind::Binary, 0.0, 1.0)
    }

    /// Add to a column's objective coefficient.
    pub fn add_objective(&mut self, col: usize, delta: f64) {
        self.cols[col].objective += delta;
    }

    /// Pin a column to a constant value.
    pub fn fix_col(&mut self, col: usize, value: f64) {
        self.cols[col].lower = value;
        self.cols[col].upper = value;
    }

    pub fn set_col_lower(&mut self, col: usize, lower: f64) {
        self.cols[col].lower = lower;
    }

    pub fn set_col_upper(&mut self, col: usize, upper: f64) {
        self.cols[col].upper = upper;
    }

    /// Add a row, combining duplicate column references.
    pub fn add_row(&mut self, lower: f64, upper: f64, mut coeffs: Vec<(usize, f64)>) -> usize {
        debug_assert!(lower <= upper, "row bounds inverted");
        debug_assert!(
            coeffs.iter().all(|&(col, _)| col < self.cols.len()),
            "row references a column that does not exist"
        );
        coeffs.sort_unstable_by_key(|&(col, _)| col);
        coeffs.dedup_by(|next, prev| {
            if next.0 == prev.0 {
                prev.1 += next.1;
                true
            } else {
                false
            }
        });
        coeffs.retain(|&(_, c)| c != 0.0);
        self.rows.push(Row {
            lower,
            upper,
            coeffs,
        });
        self.rows.len() - 1
    }

    pub fn add_eq(&mut self, rhs: f64, coeffs: Vec<(usize, f64)>) -> usize {
        self.add_row(rhs, rhs, coeffs)
    }

    pub fn add_le(&mut self, rhs: f64, coeffs: Vec<(usize, f64)>) -> usize {
        self.add_row(f64::NEG_INFINITY, rhs, coeffs)
    }

    pub fn add_ge(&mut self, rhs: f64, coeffs: Vec<(usize, f64)>) -> usize {
        self.add_row(rhs, f64::INFINITY, coeffs)
    }

    /// Objective value of a primal vector under this problem's coefficients.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.cols
            .iter()
            .zip(x)
            .map(|(col, value)| col.objective * value)
            .sum()
    }
}
