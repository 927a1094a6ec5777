use log::{debug, info};

use crate::config::RenderConfig;
use crate::data::extract::extract;
use crate::data::parameter::Parameter;
use crate::error::HistogramError;
use crate::render::isolated::{IsolatedRenderExecutor, RenderBackend};
use crate::render::plot::RenderSpec;
use crate::results::HistogramPlotResults;
use crate::storage::ResultsRetrieval;

// ---------------------------------------------------------------------------
// Histogram plot service
// ---------------------------------------------------------------------------

/// Builds difference histograms for stored matchup executions.
pub struct HistogramPlotService<S, R = IsolatedRenderExecutor> {
    storage: S,
    renderer: R,
    size: (u32, u32),
}

impl<S: ResultsRetrieval> HistogramPlotService<S> {
    /// Worker-process rendering with the image size, timeout and worker
    /// executable taken from `config`.
    pub fn from_config(storage: S, config: &RenderConfig) -> Self {
        let (width, height) = config.size();
        Self::new(storage, IsolatedRenderExecutor::from_config(config)).with_size(width, height)
    }
}

impl<S: ResultsRetrieval, R: RenderBackend> HistogramPlotService<S, R> {
    pub fn new(storage: S, renderer: R) -> Self {
        Self {
            storage,
            renderer,
            size: RenderConfig::default().size(),
        }
    }

    /// Image size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Plot `primary - secondary` of `parameter` for the execution stored
    /// under `execution_id`.
    ///
    /// Only the first configured secondary dataset is compared. Storage
    /// errors (including not-found) are returned unchanged; unknown
    /// parameter keys fall back to sea surface temperature, while the
    /// envelope reports `parameter` as requested.
    pub fn create_histogram_plot(
        &self,
        execution_id: &str,
        parameter: &str,
        norm_curve: bool,
    ) -> Result<HistogramPlotResults, HistogramError> {
        let stored = self.storage.retrieve_results(execution_id)?;

        let primary = stored.params.primary.clone();
        let secondary = stored
            .params
            .first_secondary()
            .ok_or_else(|| {
                HistogramError::InvalidParams(format!(
                    "execution '{execution_id}' has no matchup datasets"
                ))
            })?
            .to_string();
        if stored.params.matchup.len() > 1 {
            debug!(
                "execution '{execution_id}': plotting {secondary} only, ignoring {:?}",
                &stored.params.matchup[1..]
            );
        }

        let param = Parameter::resolve(parameter);
        let series = extract(&stored.records, &secondary, parameter);
        debug!(
            "execution '{execution_id}': {} of {} pairs qualify for {param}",
            series.len(),
            stored.pair_count()
        );

        let (width, height) = self.size;
        let spec = RenderSpec::new(&primary, &secondary, param, norm_curve).with_size(width, height);
        let plot = self.renderer.render(&series, &spec)?;
        info!(
            "execution '{execution_id}': {primary} vs. {secondary} histogram, n = {}",
            series.len()
        );

        Ok(HistogramPlotResults::new(
            series,
            parameter.to_string(),
            primary,
            secondary,
            stored.params.raw,
            stored.stats,
            None,
            None,
            None,
            Some(execution_id.to_string()),
            plot,
        ))
    }
}
