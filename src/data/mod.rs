/// Data layer: core types, loading, and the transformation pipeline.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .json  (one or more export files)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ assemble  │  concat, normalize dates, sort → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ transform │  named prepare steps (in place)
///   └──────────┘
///        │  × one per output definition
///        ▼
///   ┌──────────────────────────┐
///   │ filter → recalc → project │  → (date, value) rows
///   └──────────────────────────┘
/// ```
pub mod assemble;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod project;
pub mod recalc;
pub mod transform;
