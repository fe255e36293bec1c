//! Standalone HTML evaluation report.
//!
//! Sections collect inline plotly plots and maud-rendered blocks; `render`
//! produces a self-contained page with the plotly.js CDN script so the
//! output opens directly in a browser.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use ndarray::Array1;
use plotly::Plot;

use crate::report::plots::{plot_probability_histogram, plot_roc};
use crate::stats::{evaluate_at, roc_points, CutoffSummary};

pub struct ReportSection {
    title: String,
    blocks: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn add_text(&mut self, text: &str) {
        self.blocks.push(html! { p { (text) } });
    }

    pub fn add_plot(&mut self, plot: &Plot) {
        let div = plot.to_inline_html(None);
        self.blocks.push(PreEscaped(div));
    }

    /// Add the cutoff table, rates rounded to three decimals.
    pub fn add_cutoff_table(&mut self, summaries: &[CutoffSummary]) {
        let table = html! {
            table {
                thead {
                    tr {
                        th { "Cutoff" }
                        th { "TP" } th { "FP" } th { "FN" } th { "TN" }
                        th { "TPR" } th { "FPR" }
                    }
                }
                tbody {
                    @for s in summaries {
                        tr {
                            td { (format!("{:.2}", s.cutoff)) }
                            td { (s.table.true_positives) }
                            td { (s.table.false_positives) }
                            td { (s.table.false_negatives) }
                            td { (s.table.true_negatives) }
                            td { (format!("{:.3}", s.true_positive_rate)) }
                            td { (format!("{:.3}", s.false_positive_rate)) }
                        }
                    }
                }
            }
        };
        self.blocks.push(table);
    }
}

pub struct Report {
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str) -> Self {
        Report {
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S");
        let markup = html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src="https://cdn.plot.ly/plotly-2.12.1.min.js" {}
                }
                body {
                    h1 { (self.title) }
                    p { "Generated " (generated) }
                    @for section in &self.sections {
                        h2 { (section.title) }
                        @for block in &section.blocks {
                            (PreEscaped(block.0.as_str()))
                        }
                    }
                }
            }
        };
        markup.into_string()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(&path, self.render())
            .with_context(|| format!("Failed to write report to {}", path.as_ref().display()))?;
        log::info!("Wrote report to {}", path.as_ref().display());
        Ok(())
    }
}

/// Assemble the standard evaluation report: the probability histogram, the
/// ROC sweep, and a table of the requested cutoffs.
pub fn churn_report(
    scores: &Array1<f64>,
    labels: &Array1<i32>,
    cutoffs: &[f64],
) -> Result<Report> {
    let mut report = Report::new("Churn model evaluation");

    let mut histogram_section = ReportSection::new("Predicted probabilities");
    let histogram = plot_probability_histogram(scores, labels, "Predicted churn probability")
        .map_err(anyhow::Error::msg)?;
    histogram_section.add_plot(&histogram);
    report.add_section(histogram_section);

    let mut roc_section = ReportSection::new("Cutoff sweep");
    let points = roc_points(scores, labels, 101)?;
    let roc = plot_roc(&points, "TPR vs FPR across cutoffs").map_err(anyhow::Error::msg)?;
    roc_section.add_plot(&roc);

    let summaries = cutoffs
        .iter()
        .map(|&cutoff| evaluate_at(scores, labels, cutoff))
        .collect::<Result<Vec<_>, _>>()?;
    roc_section.add_cutoff_table(&summaries);
    report.add_section(roc_section);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_sections_and_rates() {
        let scores = Array1::from_vec(vec![0.05, 0.03, 0.25, 0.13, 0.07]);
        let labels = Array1::from_vec(vec![0, 0, 1, 0, 0]);

        let report = churn_report(&scores, &labels, &[0.2, 0.5]).unwrap();
        let page = report.render();

        assert!(page.contains("Churn model evaluation"));
        assert!(page.contains("Predicted probabilities"));
        assert!(page.contains("Cutoff sweep"));
        assert!(page.contains("1.000")); // TPR at cutoff 0.2 for the toy data
    }
}
