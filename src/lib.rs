//! matchup-histogram - difference histograms for matched observations
//!
//! Given a stored matchup execution (primary observations, each with the
//! secondary observations matched to it), this crate computes
//! `primary - secondary` for one parameter and renders the distribution as
//! a PNG histogram, optionally with a fitted normal curve.
//!
//! Rendering runs in a short-lived worker process (the `matchup-histogram`
//! binary) so that no plotting state survives from one request to the next.
//!
//! ```no_run
//! use matchup_histogram::{FileResultsStore, HistogramPlotService, RenderConfig};
//!
//! let config = RenderConfig::load("render.toml".as_ref())?;
//! let service = HistogramPlotService::from_config(FileResultsStore::new("results"), &config);
//! let plot = service.create_histogram_plot("run-1", "sst", true)?;
//! std::fs::write("histogram.png", plot.to_image())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod render;
pub mod results;
pub mod service;
pub mod storage;

pub use config::RenderConfig;
pub use data::extract::{extract, DifferenceSeries};
pub use data::model::{FieldValue, MatchRecord, MatchupParams, MatchupRecord, MatchupResults};
pub use data::parameter::Parameter;
pub use error::{HistogramError, RenderError, RetrievalError};
pub use render::isolated::{InProcessRenderer, IsolatedRenderExecutor, RenderBackend};
pub use render::plot::{render, PlotArtifact, RenderSpec};
pub use results::{HistogramPlotResults, QueryResults};
pub use service::HistogramPlotService;
pub use storage::{FileResultsStore, ResultsRetrieval};
