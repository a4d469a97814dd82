/// Data layer: corpus discovery, signal parsing, and signal filters.
///
/// Architecture:
/// ```text
///  input root
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  walk root → Corpus, parse .csv → Signal
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  moving average → peaks (PeakSet)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  OutputRecord rows, ImageParams / SignalParams
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
