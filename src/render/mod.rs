/// Render layer: binning, drawing, and process isolation.
///
/// ```text
///   DifferenceSeries + RenderSpec
///        │
///        ▼
///   ┌──────────────────────┐
///   │ IsolatedRenderExecutor│  spawn worker, send RenderJob on stdin
///   └──────────────────────┘
///        │  (child process)
///        ▼
///   ┌──────────┐
///   │ histogram │  50 bins, normal fit, chart labels
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   plot    │  plotters bitmap → PNG on stdout
///   └──────────┘
/// ```

pub mod histogram;
pub mod isolated;
pub mod plot;
