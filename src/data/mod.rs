/// Data layer: sampler outputs and RV measurements.
///
/// Architecture:
/// ```text
///  RV files (.txt/.rdb)      posterior_sample.txt
///        │                          │
///        ▼                          ▼
///   ┌──────────┐             ┌────────────┐
///   │  loader   │             │ posterior  │  layout from ModelSetup
///   └──────────┘             └────────────┘
///        │                          │
///        ▼                          ▼
///   ┌───────────┐          ┌──────────────────┐
///   │ RvDataset │          │ PosteriorSamples  │  + ColumnLayout
///   └───────────┘          └──────────────────┘
///        │
///        ▼
///   combine (one time-sorted file for all instruments)
/// ```

pub mod combine;
pub mod loader;
pub mod model;
pub mod posterior;
