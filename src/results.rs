use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::data::extract::DifferenceSeries;
use crate::render::plot::PlotArtifact;

// ---------------------------------------------------------------------------
// Query results envelope
// ---------------------------------------------------------------------------

/// The generic response body shared by matchup queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults<T> {
    pub results: T,
    /// The stored request parameters.
    pub args: JsonValue,
    /// The stored execution statistics.
    pub details: JsonValue,
    pub bounds: Option<JsonValue>,
    pub count: Option<usize>,
    pub compute_options: Option<JsonValue>,
    pub execution_id: Option<String>,
}

/// A rendered difference histogram and the data behind it.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramPlotResults {
    #[serde(flatten)]
    pub query: QueryResults<DifferenceSeries>,
    /// The parameter key as requested, before any fallback.
    pub parameter: String,
    pub primary: String,
    pub secondary: String,
    #[serde(skip)]
    plot: PlotArtifact,
}

impl HistogramPlotResults {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        results: DifferenceSeries,
        parameter: String,
        primary: String,
        secondary: String,
        args: JsonValue,
        details: JsonValue,
        bounds: Option<JsonValue>,
        count: Option<usize>,
        compute_options: Option<JsonValue>,
        execution_id: Option<String>,
        plot: PlotArtifact,
    ) -> Self {
        Self {
            query: QueryResults {
                results,
                args,
                details,
                bounds,
                count,
                compute_options,
                execution_id,
            },
            parameter,
            primary,
            secondary,
            plot,
        }
    }

    /// The differences that were plotted.
    pub fn differences(&self) -> &[f64] {
        &self.query.results
    }

    /// The PNG exactly as the renderer produced it.
    pub fn to_image(&self) -> &[u8] {
        self.plot.as_bytes()
    }

    pub fn into_image(self) -> PlotArtifact {
        self.plot
    }

    /// Everything but the image, as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HistogramPlotResults {
        HistogramPlotResults::new(
            vec![2.0, -0.5],
            "sst".into(),
            "A".into(),
            "B".into(),
            serde_json::json!({ "primary": "A", "matchup": ["B"] }),
            serde_json::json!({ "timeToComplete": 4 }),
            None,
            None,
            None,
            Some("run-1".into()),
            PlotArtifact::from_bytes(vec![0x89, b'P', b'N', b'G', 1, 2, 3]),
        )
    }

    #[test]
    fn test_image_is_unmodified() {
        let r = sample();
        assert_eq!(r.to_image(), &[0x89, b'P', b'N', b'G', 1, 2, 3]);
        assert_eq!(r.differences(), &[2.0, -0.5]);
    }

    #[test]
    fn test_json_omits_image() {
        let json: JsonValue = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["results"], serde_json::json!([2.0, -0.5]));
        assert_eq!(json["executionId"], "run-1");
        assert_eq!(json["parameter"], "sst");
        assert_eq!(json["secondary"], "B");
        assert_eq!(json["details"]["timeToComplete"], 4);
        assert!(json["computeOptions"].is_null());
        assert!(json.get("plot").is_none());
    }
}
