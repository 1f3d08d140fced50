// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use eda_charts::{ChartParams, ChartPoint, ChartType, SynthRegistry};
use eda_contracts::error::EdaError;
use eda_contracts::types::{ColumnStat, CorrelationData};
use serde_json::json;

fn registry() -> SynthRegistry {
    SynthRegistry::with_defaults()
}

fn age_column() -> ColumnStat {
    serde_json::from_value(json!({
        "name": "age",
        "dtype": "int64",
        "count": 500,
        "null_count": 0,
        "null_percentage": 0.0,
        "unique_count": 70,
        "mean": 40.0,
        "median": 38.0,
        "std": 12.0,
        "min": 18.0,
        "max": 90.0,
        "q25": 30.0,
        "q75": 52.0,
        "distribution_type": "normal"
    }))
    .unwrap()
}

fn income_column() -> ColumnStat {
    serde_json::from_value(json!({
        "name": "income",
        "dtype": "float64",
        "count": 500,
        "null_count": 5,
        "null_percentage": 1.0,
        "unique_count": 480,
        "mean": 52000.0,
        "median": 48000.0,
        "std": 15000.0,
        "min": 12000.0,
        "max": 250000.0,
        "q25": 38000.0,
        "q75": 61000.0,
        "skewness": 1.8,
        "distribution_type": "skewed",
        "outliers": {
            "iqr_method": {
                "count": 3,
                "percentage": 0.6,
                "bounds": {"lower": 5000.0, "upper": 95500.0},
                "values": [180000.0, 210000.0, 250000.0]
            }
        }
    }))
    .unwrap()
}

fn region_column() -> ColumnStat {
    serde_json::from_value(json!({
        "name": "region",
        "dtype": "object",
        "count": 500,
        "null_count": 20,
        "null_percentage": 4.0,
        "unique_count": 4,
        "top_values": {
            "north": {"count": 210, "percentage": 42.0},
            "south": {"count": 150, "percentage": 30.0},
            "east": {"count": 80, "percentage": 16.0},
            "west": {"count": 40, "percentage": 8.0}
        }
    }))
    .unwrap()
}

fn pair_correlations() -> CorrelationData {
    serde_json::from_value(json!({
        "correlations": {
            "pearson": {
                "age": {"income": 0.78}
            }
        }
    }))
    .unwrap()
}

fn params(values: serde_json::Value) -> ChartParams {
    serde_json::from_value(values).unwrap()
}

#[test]
fn histogram_bins_are_positive_and_bounded() {
    let columns = vec![age_column()];
    let series = registry()
        .synthesize(
            ChartType::Histogram,
            &columns,
            None,
            &params(json!({"column": "age", "max_bins": 12})),
        )
        .unwrap();
    assert!(series.points.len() <= 12);
    assert!(!series.points.is_empty());
    for point in &series.points {
        match point {
            ChartPoint::Frequency { count, .. } => assert!(*count > 0.0),
            other => panic!("histogram emitted non-frequency point: {other:?}"),
        }
    }
    assert!(series.approximate);
    assert!(series.caveat.is_some());
}

#[test]
fn histogram_without_column_is_missing_parameter() {
    let columns = vec![age_column()];
    let err = registry()
        .synthesize(ChartType::Histogram, &columns, None, &ChartParams::default())
        .unwrap_err();
    assert!(matches!(err, EdaError::MissingParameter { .. }));
}

#[test]
fn histogram_on_unknown_column_is_not_found() {
    let columns = vec![age_column()];
    let err = registry()
        .synthesize(
            ChartType::Histogram,
            &columns,
            None,
            &params(json!({"column": "salary"})),
        )
        .unwrap_err();
    assert!(matches!(err, EdaError::ColumnNotFound { .. }));
}

#[test]
fn histogram_on_categorical_column_is_unsupported() {
    let columns = vec![region_column()];
    let err = registry()
        .synthesize(
            ChartType::Histogram,
            &columns,
            None,
            &params(json!({"column": "region"})),
        )
        .unwrap_err();
    assert!(matches!(err, EdaError::UnsupportedOperation { .. }));
}

#[test]
fn skewed_histogram_leans_past_the_mean() {
    let columns = vec![income_column()];
    let series = registry()
        .synthesize(
            ChartType::Histogram,
            &columns,
            None,
            &params(json!({"column": "income"})),
        )
        .unwrap();
    // Positive skewness widens the upper flank, so more bins survive above
    // the mean than below it.
    let (above, below) = series.points.iter().fold((0usize, 0usize), |acc, p| {
        if let ChartPoint::Frequency { value, .. } = p {
            let x: f64 = value.parse().unwrap();
            if x >= 52000.0 {
                (acc.0 + 1, acc.1)
            } else {
                (acc.0, acc.1 + 1)
            }
        } else {
            acc
        }
    });
    assert!(above >= below);
}

#[test]
fn boxplot_is_exactly_five_ordered_points() {
    let columns = vec![age_column()];
    let series = registry()
        .synthesize(
            ChartType::Boxplot,
            &columns,
            None,
            &params(json!({"column": "age"})),
        )
        .unwrap();
    assert_eq!(series.points.len(), 5);
    let values: Vec<f64> = series
        .points
        .iter()
        .map(|p| match p {
            ChartPoint::Box { value, .. } => *value,
            other => panic!("boxplot emitted non-box point: {other:?}"),
        })
        .collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!(!series.approximate);
}

#[test]
fn scatter_emits_fifty_points_within_ranges() {
    let columns = vec![age_column(), income_column()];
    let corr = pair_correlations();
    let series = registry()
        .synthesize(
            ChartType::Scatter,
            &columns,
            Some(&corr),
            &params(json!({"x_column": "age", "y_column": "income"})),
        )
        .unwrap();
    assert_eq!(series.points.len(), 50);
    for point in &series.points {
        match point {
            ChartPoint::Xy { x, y, .. } => {
                assert!((18.0..=90.0).contains(x));
                assert!((12000.0..=250000.0).contains(y));
            }
            other => panic!("scatter emitted non-xy point: {other:?}"),
        }
    }
    assert!(series.approximate);
}

#[test]
fn scatter_without_columns_falls_back_to_best_pair() {
    let columns = vec![age_column(), income_column()];
    let corr = pair_correlations();
    let series = registry()
        .synthesize(ChartType::Scatter, &columns, Some(&corr), &ChartParams::default())
        .unwrap();
    assert_eq!(series.points.len(), 50);
    assert_eq!(series.x_label, "age");
    assert_eq!(series.y_label, "income");
}

#[test]
fn scatter_matrix_only_uses_fallback_range() {
    let corr = pair_correlations();
    let series = registry()
        .synthesize(
            ChartType::Scatter,
            &[],
            Some(&corr),
            &params(json!({"x_column": "age", "y_column": "income"})),
        )
        .unwrap();
    assert_eq!(series.points.len(), 50);
    for point in &series.points {
        if let ChartPoint::Xy { x, y, .. } = point {
            assert!((0.0..=100.0).contains(x));
            assert!((0.0..=100.0).contains(y));
        }
    }
}

#[test]
fn heatmap_keeps_strong_upper_triangle_sorted() {
    let corr: CorrelationData = serde_json::from_value(json!({
        "correlations": {
            "pearson": {
                "a": {"b": 0.9, "c": -0.5, "d": 0.05},
                "b": {"c": 0.3},
                "c": {"d": -0.75},
                "d": {}
            }
        }
    }))
    .unwrap();
    let series = registry()
        .synthesize(ChartType::CorrelationHeatmap, &[], Some(&corr), &ChartParams::default())
        .unwrap();
    let values: Vec<f64> = series
        .points
        .iter()
        .map(|p| match p {
            ChartPoint::Cell { value, .. } => *value,
            other => panic!("heatmap emitted non-cell point: {other:?}"),
        })
        .collect();
    // |r| = 0.05 dropped; the rest sorted by magnitude.
    assert_eq!(values.len(), 4);
    assert!(values
        .windows(2)
        .all(|w| w[0].abs() >= w[1].abs()));
    assert!(values.len() <= 15);
}

#[test]
fn outliers_cap_at_fifty_and_flag_points() {
    let columns = vec![income_column()];
    let series = registry()
        .synthesize(
            ChartType::Outliers,
            &columns,
            None,
            &params(json!({"column": "income"})),
        )
        .unwrap();
    assert_eq!(series.points.len(), 3);
    for point in &series.points {
        match point {
            ChartPoint::Box { outlier, .. } => assert!(*outlier),
            other => panic!("outliers emitted non-box point: {other:?}"),
        }
    }
}

#[test]
fn missing_values_sorted_descending_capped_at_ten() {
    let columns: Vec<ColumnStat> = (0..14)
        .map(|i| {
            serde_json::from_value(json!({
                "name": format!("col{i}"),
                "dtype": "float64",
                "count": 100,
                "null_count": i,
                "null_percentage": i as f64,
                "unique_count": 10
            }))
            .unwrap()
        })
        .collect();
    let series = registry()
        .synthesize(ChartType::MissingValues, &columns, None, &ChartParams::default())
        .unwrap();
    assert_eq!(series.points.len(), 10);
    let percentages: Vec<f64> = series
        .points
        .iter()
        .map(|p| match p {
            ChartPoint::Frequency { count, .. } => *count,
            other => panic!("missing-values emitted non-frequency point: {other:?}"),
        })
        .collect();
    assert!(percentages.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(percentages[0], 13.0);
}

#[test]
fn bar_with_column_orders_top_values() {
    let columns = vec![region_column()];
    let series = registry()
        .synthesize(
            ChartType::Bar,
            &columns,
            None,
            &params(json!({"column": "region"})),
        )
        .unwrap();
    assert_eq!(series.points.len(), 4);
    if let ChartPoint::Frequency { value, count } = &series.points[0] {
        assert_eq!(value, "north");
        assert_eq!(*count, 210.0);
    } else {
        panic!("bar emitted non-frequency point");
    }
}

#[test]
fn bar_without_column_aggregates_across_columns() {
    let columns = vec![region_column(), age_column()];
    let series = registry()
        .synthesize(ChartType::Bar, &columns, None, &ChartParams::default())
        .unwrap();
    assert_eq!(series.points.len(), 1);
    if let ChartPoint::Frequency { value, count } = &series.points[0] {
        assert_eq!(value, "region");
        assert_eq!(*count, 4.0);
    } else {
        panic!("bar emitted non-frequency point");
    }
}

#[test]
fn density_evaluates_fifty_kernel_points() {
    let columns = vec![age_column()];
    let series = registry()
        .synthesize(
            ChartType::Density,
            &columns,
            None,
            &params(json!({"column": "age"})),
        )
        .unwrap();
    assert_eq!(series.points.len(), 50);
    assert!(series.approximate);
    assert_eq!(series.y_label, "Density");
}
