//! Free-format MPS export of a [`LinearProblem`].
//!
//! Two-sided inequality rows are written as `L` rows with a RANGES entry;
//! binaries use `BV` bounds and sit inside `INTORG`/`INTEND` marker pairs in
//! the COLUMNS section.

use crate::lp::{ColKind, LinearProblem};
use std::io::{self, Write};

/// Write `problem` as free-format MPS. `col_name` supplies the column
/// names; row names are positional (`R0`, `R1`, ...).
pub fn write_mps<W: Write>(
    problem: &LinearProblem,
    col_name: &dyn Fn(usize) -> String,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "NAME          FPLPLAN")?;
    writeln!(out, "ROWS")?;
    writeln!(out, " N  OBJ")?;
    for (idx, row) in problem.rows().iter().enumerate() {
        let kind = if row.lower == row.upper {
            'E'
        } else if row.lower.is_finite() && row.upper.is_finite() {
            // Ranged row, written as L with a RANGES entry below.
            'L'
        } else if row.upper.is_finite() {
            'L'
        } else {
            'G'
        };
        writeln!(out, " {}  R{}", kind, idx)?;
    }

    // Column-major coefficients: invert the row-major storage.
    let mut by_col: Vec<Vec<(usize, f64)>> = vec![Vec::new(); problem.num_cols()];
    for (row_idx, row) in problem.rows().iter().enumerate() {
        for &(col, coeff) in &row.coeffs {
            by_col[col].push((row_idx, coeff));
        }
    }

    writeln!(out, "COLUMNS")?;
    let mut in_integer_block = false;
    let mut marker = 0usize;
    for (col_idx, col) in problem.cols().iter().enumerate() {
        let integral = matches!(col.kind, ColKind::Integer | ColKind::Binary);
        if integral != in_integer_block {
            let kind = if integral { "'INTORG'" } else { "'INTEND'" };
            writeln!(out, "    MARKER{}  'MARKER'  {}", marker, kind)?;
            marker += 1;
            in_integer_block = integral;
        }
        let name = col_name(col_idx);
        if col.objective != 0.0 {
            writeln!(out, "    {}  OBJ  {}", name, fmt_num(col.objective))?;
        }
        for &(row_idx, coeff) in &by_col[col_idx] {
            writeln!(out, "    {}  R{}  {}", name, row_idx, fmt_num(coeff))?;
        }
    }
    if in_integer_block {
        writeln!(out, "    MARKER{}  'MARKER'  'INTEND'", marker)?;
    }

    writeln!(out, "RHS")?;
    for (idx, row) in problem.rows().iter().enumerate() {
        let rhs = if row.lower == row.upper || !row.upper.is_finite() {
            row.lower
        } else {
            row.upper
        };
        if rhs != 0.0 {
            writeln!(out, "    RHS  R{}  {}", idx, fmt_num(rhs))?;
        }
    }

    let ranged: Vec<(usize, f64)> = problem
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            row.lower.is_finite() && row.upper.is_finite() && row.lower != row.upper
        })
        .map(|(idx, row)| (idx, row.upper - row.lower))
        .collect();
    if !ranged.is_empty() {
        writeln!(out, "RANGES")?;
        for (idx, range) in ranged {
            writeln!(out, "    RNG  R{}  {}", idx, fmt_num(range))?;
        }
    }

    writeln!(out, "BOUNDS")?;
    for (col_idx, col) in problem.cols().iter().enumerate() {
        let name = col_name(col_idx);
        match col.kind {
            ColKind::Binary if col.lower == 0.0 && col.upper == 1.0 => {
                writeln!(out, " BV BND  {}", name)?;
            }
            _ => {
                if col.lower == col.upper {
                    writeln!(out, " FX BND  {}  {}", name, fmt_num(col.lower))?;
                    continue;
                }
                if col.lower != 0.0 {
                    if col.lower.is_finite() {
                        writeln!(out, " LO BND  {}  {}", name, fmt_num(col.lower))?;
                    } else {
                        writeln!(out, " MI BND  {}", name)?;
                    }
                }
                if col.upper.is_finite() {
                    writeln!(out, " UP BND  {}  {}", name, fmt_num(col.upper))?;
                }
            }
        }
    }

    writeln!(out, "ENDATA")?;
    Ok(())
}

fn fmt_num(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
