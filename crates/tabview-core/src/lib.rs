//! Tabview core: dimension paths, tab normalization and the selection-set
//! algorithms behind filter lists.
//!
//! Zero I/O. Configuration arrives already fetched and deserialized; this
//! crate only transforms it.

pub mod data_source;
pub mod dim_path;
pub mod error;
pub mod selection;
pub mod tab;

pub use data_source::{RawDataSource, find_data_source};
pub use dim_path::{DimPath, RawDimPath, make_dim_path};
pub use error::{Result, TabError};
pub use selection::{
    FilterInput, FilterOption, SelectionTally, filter_options, lookup, partition_by_sort_key,
    select_all, select_none, select_only, selection_tally, toggle,
};
pub use tab::{
    RawTabConfig, RawTabContent, TabConfig, TabContent, TabSummary, find_tab, normalize_tab,
};
