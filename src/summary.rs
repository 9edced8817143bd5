//! The computed result and its labeled-row summary.
//!
//! The summary's row structure is the primary observable output of the
//! whole system; labels and ordering follow the scoring service's plan
//! card exactly.

use serde::{Deserialize, Serialize};

use crate::format::{display_numeric, display_signed};

/// Snapshot of the externally computed financial result. Immutable once
/// received; consumed for display and for biasing free-chat fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResult {
    pub repayment_rate: f64,
    pub monthly_repayment_total: u64,
    pub total_repayment: u64,
    pub total_debt: u64,
    pub secured_debt: u64,
    pub unsecured_debt: u64,
    pub monthly_income: u64,
    pub living_expenses: u64,
    pub monthly_available: u64,
}

impl SurveyResult {
    /// The forgiveness estimate, the only quantity derived client-side.
    /// Signed and unclamped: malformed data may push it negative, and it
    /// is displayed as-is.
    pub fn forgiveness_estimate(&self) -> i64 {
        self.unsecured_debt as i64 - self.total_repayment as i64
    }
}

/// One labeled row of the plan summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
    pub highlight: bool,
}

impl SummaryRow {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            highlight: false,
        }
    }

    fn highlighted(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            highlight: true,
            ..Self::new(label, value)
        }
    }
}

/// The structured repayment-plan summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub title: &'static str,
    pub rows: Vec<SummaryRow>,
}

impl ResultSummary {
    pub fn from_result(result: &SurveyResult) -> Self {
        let secured = result.secured_debt > 0;
        let mut rows = vec![
            SummaryRow::highlighted("예상 변제율", format!("{:.1}%", result.repayment_rate)),
            SummaryRow::new("총 채무", won(result.total_debt)),
        ];
        if secured {
            rows.push(SummaryRow::new("└ 별제권 (담보)", won(result.secured_debt)));
        }
        rows.push(SummaryRow::new(
            if secured { "└ 무담보 채무" } else { "무담보 채무" },
            won(result.unsecured_debt),
        ));
        rows.push(SummaryRow::new("총 변제액 (36개월)", won(result.total_repayment)));
        rows.push(SummaryRow::new("월 변제금", won(result.monthly_repayment_total)));
        rows.push(SummaryRow::highlighted(
            "예상 탕감액",
            format!("{}원", display_signed(result.forgiveness_estimate())),
        ));
        Self {
            title: "변제계획 요약",
            rows,
        }
    }

    /// Render the summary as the transcript message appended on completion.
    pub fn render(&self) -> String {
        let mut out = String::from("분석이 완료되었습니다.\n\n");
        out.push_str(&format!("[{}]\n", self.title));
        for row in &self.rows {
            out.push_str(&format!("{}: {}\n", row.label, row.value));
        }
        out.trim_end().to_string()
    }
}

fn won(amount: u64) -> String {
    format!("{}원", display_numeric(amount))
}
