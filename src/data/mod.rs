/// Data layer: core types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file/sheet → Table
///   └──────────┘
///        │   memoized per (file, sheet) by `cache`
///        ▼
///   ┌──────────┐
///   │ records   │  Table → CaseRecord / IncomeRecord
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → filtered slice
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod records;
