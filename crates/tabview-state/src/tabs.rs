use tabview_core::{
    RawDataSource, RawTabConfig, TabConfig, TabContent, TabError, TabSummary, find_data_source,
    find_tab, normalize_tab,
};

use crate::config::DataViewData;
use crate::error::Result;
use crate::graph::{Family, Graph, Root, Selector};

/// Handles for the tab nodes registered on a [`Graph`].
///
/// Roots are written by the data loader (`all_tabs`, `all_data_sources`) and
/// by navigation (`active_tab_slug`); everything else is derived.
#[derive(Clone, Copy, Debug)]
pub struct TabState {
    pub all_tabs: Root<Vec<RawTabConfig>>,
    pub all_data_sources: Root<Vec<RawDataSource>>,
    pub active_tab_slug: Root<String>,
    pub tab_by_slug: Family<String, TabConfig>,
    pub tab_content_by_slug: Family<String, TabContent>,
    pub active_tab_content: Selector<TabContent>,
    pub tab_summaries: Selector<Vec<TabSummary>>,
    pub data_source_by_id: Family<String, RawDataSource>,
}

impl TabState {
    pub fn register(graph: &mut Graph) -> Self {
        let all_tabs: Root<Vec<RawTabConfig>> = graph.root("allTabs");
        let all_data_sources: Root<Vec<RawDataSource>> = graph.root("allDataSources");
        let active_tab_slug: Root<String> = graph.root("activeTabSlug");

        let tab_by_slug = graph.family("tabBySlug", move |r, slug: &String| {
            let tabs = r.root(&all_tabs)?;
            let tab = find_tab(&tabs, slug).ok_or_else(|| TabError::tab_not_found(slug))?;
            Ok(normalize_tab(tab)?)
        });

        let tab_content_by_slug = graph.family("tabContentBySlug", move |r, slug: &String| {
            Ok(r.get(&tab_by_slug, slug)?.content.clone())
        });

        let active_tab_content = graph.selector("activeTabContent", move |r| {
            let slug = r.root(&active_tab_slug)?;
            Ok((*r.get(&tab_content_by_slug, &slug)?).clone())
        });

        let tab_summaries = graph.selector("tabSummaries", move |r| {
            let tabs = r.root(&all_tabs)?;
            Ok(tabs.iter().map(TabSummary::from).collect::<Vec<_>>())
        });

        let data_source_by_id = graph.family("dataSourceById", move |r, id: &String| {
            let sources = r.root(&all_data_sources)?;
            let source = find_data_source(&sources, id)
                .ok_or_else(|| TabError::data_source_not_found(id))?;
            Ok(source.clone())
        });

        Self {
            all_tabs,
            all_data_sources,
            active_tab_slug,
            tab_by_slug,
            tab_content_by_slug,
            active_tab_content,
            tab_summaries,
            data_source_by_id,
        }
    }

    /// Write a freshly loaded tab and data source configuration.
    pub fn load(&self, graph: &mut Graph, data: DataViewData) -> Result<()> {
        tracing::debug!(
            tabs = data.data_tabs.len(),
            sources = data.data_sources.len(),
            "loading data view configuration"
        );
        graph.set(&self.all_tabs, data.data_tabs)?;
        graph.set(&self.all_data_sources, data.data_sources)
    }

    /// Make `slug` the active tab.
    pub fn navigate(&self, graph: &mut Graph, slug: &str) -> Result<()> {
        graph.set(&self.active_tab_slug, slug.to_string())
    }
}
