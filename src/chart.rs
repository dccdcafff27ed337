//! Stacked bar-chart series built from decoded trips.
//!
//! One category per trip, one stacked series per emission source.

use serde::Serialize;

use crate::results::SimulationResults;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub source: String,
    pub color: String,
    /// kgCO2eq per trip, aligned with [`StackedChart::categories`].
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedChart {
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Sums each trip's emission parts by source. Sources appear in the order
/// they are first met; the first color seen for a source is kept.
pub fn stacked_series(results: &SimulationResults) -> StackedChart {
    let trip_count = results.trips.len();
    let mut series: Vec<ChartSeries> = Vec::new();

    for (t, trip) in results.trips.iter().enumerate() {
        for part in trip.steps.iter().flat_map(|s| &s.emission_parts) {
            let i = match series.iter().position(|s| s.source == part.emission_source) {
                Some(i) => i,
                None => {
                    series.push(ChartSeries {
                        source: part.emission_source.clone(),
                        color: part.color.clone(),
                        values: vec![0.0; trip_count],
                    });
                    series.len() - 1
                }
            };
            series[i].values[t] += part.emissions;
        }
    }

    StackedChart {
        categories: results.trips.iter().map(|t| t.label.clone()).collect(),
        series,
    }
}
