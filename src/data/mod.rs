/// Data layer: matchup model, parameter table, loading, and extraction.
///
/// Architecture:
/// ```text
///   <execution_id>.json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse stored results → MatchupResults
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ MatchupRecord   │  primary fields + Vec<MatchRecord>
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ extract   │  parameter + secondary → DifferenceSeries
///   └──────────┘
/// ```

pub mod extract;
pub mod loader;
pub mod model;
pub mod parameter;
