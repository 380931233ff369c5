pub mod config;
pub mod error;
pub mod graph;
pub mod tabs;

pub use config::{CONFIG_FILE, DataViewData, ViewerConfig, load_view_data};
pub use error::{Result, StateError};
pub use graph::{Family, Graph, Loadable, Reader, Root, Selector, Suspend};
pub use tabs::TabState;
