use ndarray::Array1;
use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Histogram, Plot, Scatter};

use crate::stats::RocPoint;

/// Plot overlaid histograms of the predicted probabilities for churned and
/// retained customers
pub fn plot_probability_histogram(
    scores: &Array1<f64>,
    labels: &Array1<i32>,
    title: &str,
) -> Result<Plot, String> {
    // Assert that the scores and labels have the same length
    assert_eq!(
        scores.len(),
        labels.len(),
        "Scores and labels must have the same length"
    );

    // Assert that the labels are only two classes
    assert!(
        labels.iter().all(|&l| l == 0 || l == 1),
        "Labels must be composed of only two classes, 1 for churned and 0 for retained"
    );

    let mut scores_churned = Vec::new();
    let mut scores_retained = Vec::new();

    for (score, label) in scores.iter().zip(labels.iter()) {
        if *label == 1 {
            scores_churned.push(*score);
        } else {
            scores_retained.push(*score);
        }
    }

    let trace_churned = Histogram::new(scores_churned).name("Churned");

    let trace_retained = Histogram::new(scores_retained).name("Retained");

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Predicted churn probability"))
        .y_axis(Axis::new().title("Count"));

    let mut plot = Plot::new();
    plot.add_trace(trace_churned);
    plot.add_trace(trace_retained);
    plot.set_layout(layout);

    Ok(plot)
}

/// Plot the (FPR, TPR) operating points of a cutoff sweep with a dashed
/// y = x chance line.
pub fn plot_roc(points: &[RocPoint], title: &str) -> Result<Plot, String> {
    if points.is_empty() {
        return Err("Cannot plot an empty cutoff sweep".to_string());
    }

    let fpr: Vec<f64> = points.iter().map(|p| p.false_positive_rate).collect();
    let tpr: Vec<f64> = points.iter().map(|p| p.true_positive_rate).collect();

    let mut plot = Plot::new();

    let operating_points = Scatter::new(fpr, tpr)
        .mode(Mode::Markers)
        .name("Cutoff sweep");

    let chance_line = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .line(Line::new().color("red").dash(DashType::Dash));

    plot.add_trace(operating_points);
    plot.add_trace(chance_line);
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("False positive rate"))
            .y_axis(Axis::new().title("True positive rate")),
    );

    Ok(plot)
}
