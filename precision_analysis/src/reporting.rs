//! Plain text and JSON reports of calibration runs.

use serde::Serialize;

use crate::calibration::{Method, Solution};
use crate::geometry::Transform;
use crate::metrics::{ErrorSummary, Stats};

/// Column headers of the error tables.
pub const METRIC_HEADERS: [&str; 6] = ["method", "mean", "median", "rmse", "p95", "max"];

/// Renders an ASCII table with left-aligned, padded cells.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.len());
            }
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let fmt_row = |cells: Vec<&str>| -> String {
        let body: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!(" {c:<w$} "))
            .collect();
        format!("|{}|", body.join("|"))
    };

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    out.push_str(&fmt_row(headers.to_vec()));
    out.push('\n');
    out.push_str(&border);
    out.push('\n');
    for row in rows {
        out.push_str(&fmt_row(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out.push_str(&border);
    out.push('\n');
    out
}

/// Table row with four decimals per statistic.
pub fn metric_row(name: &str, stats: &Stats) -> Vec<String> {
    vec![
        name.to_string(),
        format!("{:.4}", stats.mean),
        format!("{:.4}", stats.median),
        format!("{:.4}", stats.rmse),
        format!("{:.4}", stats.p95),
        format!("{:.4}", stats.max),
    ]
}

/// Table row for a method that failed.
pub fn error_row(name: &str) -> Vec<String> {
    let mut row = vec![name.to_string()];
    row.extend(std::iter::repeat("ERR".to_string()).take(METRIC_HEADERS.len() - 1));
    row
}

/// Formats a transform as its 4x4 homogeneous matrix.
pub fn format_transform(name: &str, t: &Transform) -> String {
    let m = t.to_homogeneous();
    let mut out = format!("{name} =\n");
    for i in 0..4 {
        let row: Vec<String> = (0..4).map(|j| format!("{:.4}", m[(i, j)])).collect();
        out.push_str(&format!("[ {} ]\n", row.join(" ")));
    }
    out
}

/// Outcome of one method within a report.
#[derive(Debug, Clone, Serialize)]
pub struct MethodResult {
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<[[f64; 4]; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<[[f64; 4]; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip)]
    pub solution: Option<Solution>,
}

fn rows_of(t: &Transform) -> [[f64; 4]; 4] {
    let m = t.to_homogeneous();
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            *v = m[(i, j)];
        }
    }
    out
}

impl MethodResult {
    pub fn success(method: Method, solution: &Solution, errors: Option<ErrorSummary>) -> Self {
        Self {
            method,
            errors,
            x: Some(rows_of(&solution.x)),
            y: Some(rows_of(&solution.y)),
            failure: None,
            solution: Some(*solution),
        }
    }

    pub fn failure(method: Method, reason: impl ToString) -> Self {
        Self {
            method,
            errors: None,
            x: None,
            y: None,
            failure: Some(reason.to_string()),
            solution: None,
        }
    }
}

/// Machine readable summary of a calibration run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CalibrationReport {
    pub poses: usize,
    pub results: Vec<MethodResult>,
}

impl CalibrationReport {
    pub fn new(poses: usize) -> Self {
        Self {
            poses,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: MethodResult) {
        self.results.push(result);
    }

    /// Translation and rotation tables, in that order.
    pub fn tables(&self) -> (String, String) {
        let mut t_rows = Vec::new();
        let mut r_rows = Vec::new();
        for res in &self.results {
            let name = res.method.name();
            match &res.errors {
                Some(e) => {
                    t_rows.push(metric_row(name, &e.translation));
                    r_rows.push(metric_row(name, &e.rotation));
                }
                None => {
                    t_rows.push(error_row(name));
                    r_rows.push(error_row(name));
                }
            }
        }
        (
            render_table(&METRIC_HEADERS, &t_rows),
            render_table(&METRIC_HEADERS, &r_rows),
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
