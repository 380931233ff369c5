use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dim_path::{DimPath, RawDimPath, make_dim_path};
use crate::error::Result;

/// Tab configuration as supplied by the data-fetch layer.
///
/// Fields this crate does not interpret are kept in `extra` and passed
/// through normalization untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawTabConfig {
    pub slug: String,
    pub label: String,
    pub content: RawTabContent,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTabContent {
    #[serde(default)]
    pub primary_select: Option<RawDimPath>,
    #[serde(default)]
    pub secondary_select: Vec<RawDimPath>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized tab configuration: selection fields hold [`DimPath`]s.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TabConfig {
    pub slug: String,
    pub label: String,
    pub content: TabContent,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabContent {
    /// Zero or one path; empty when the raw config had none.
    pub primary_select: Vec<DimPath>,
    pub secondary_select: Vec<DimPath>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabContent {
    pub fn primary(&self) -> Option<&DimPath> {
        self.primary_select.first()
    }

    /// Every selectable dimension, primary first.
    pub fn all_selects(&self) -> impl Iterator<Item = &DimPath> {
        self.primary_select.iter().chain(self.secondary_select.iter())
    }
}

/// Navigation entry for a tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TabSummary {
    pub slug: String,
    pub label: String,
}

impl From<&RawTabConfig> for TabSummary {
    fn from(raw: &RawTabConfig) -> Self {
        Self {
            slug: raw.slug.clone(),
            label: raw.label.clone(),
        }
    }
}

/// Normalize a raw tab. The result owns copies of every passed-through
/// field, so later edits on either side never reach the other.
pub fn normalize_tab(raw: &RawTabConfig) -> Result<TabConfig> {
    let primary_select = match &raw.content.primary_select {
        Some(p) => vec![make_dim_path(p)?],
        None => Vec::new(),
    };
    let secondary_select = raw
        .content
        .secondary_select
        .iter()
        .map(make_dim_path)
        .collect::<Result<Vec<_>>>()?;

    Ok(TabConfig {
        slug: raw.slug.clone(),
        label: raw.label.clone(),
        content: TabContent {
            primary_select,
            secondary_select,
            extra: raw.content.extra.clone(),
        },
        extra: raw.extra.clone(),
    })
}

/// First tab with the given slug.
pub fn find_tab<'a>(tabs: &'a [RawTabConfig], slug: &str) -> Option<&'a RawTabConfig> {
    tabs.iter().find(|t| t.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabError;
    use serde_json::json;

    fn raw(value: Value) -> RawTabConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_delimited_primary() {
        let tab = raw(json!({
            "slug": "geo",
            "label": "Geography",
            "content": {
                "primarySelect": "region/country",
                "secondarySelect": ["year"]
            }
        }));
        let out = normalize_tab(&tab).unwrap();
        assert_eq!(
            out.content.primary_select,
            vec![DimPath::new(["region", "country"]).unwrap()]
        );
        assert_eq!(
            out.content.secondary_select,
            vec![DimPath::new(["year"]).unwrap()]
        );
    }

    #[test]
    fn test_normalize_null_primary() {
        let tab = raw(json!({
            "slug": "a",
            "label": "A",
            "content": { "primarySelect": null, "secondarySelect": [] }
        }));
        let out = normalize_tab(&tab).unwrap();
        assert!(out.content.primary_select.is_empty());
        assert!(out.content.primary().is_none());
    }

    #[test]
    fn test_normalize_missing_fields_default() {
        let tab = raw(json!({ "slug": "a", "label": "A", "content": {} }));
        let out = normalize_tab(&tab).unwrap();
        assert!(out.content.primary_select.is_empty());
        assert!(out.content.secondary_select.is_empty());
    }

    #[test]
    fn test_secondary_order_preserved() {
        let tab = raw(json!({
            "slug": "a",
            "label": "A",
            "content": {
                "secondarySelect": ["year", ["sex", "age"], "unit"]
            }
        }));
        let out = normalize_tab(&tab).unwrap();
        let rendered: Vec<String> = out
            .content
            .secondary_select
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(rendered, ["year", "sex/age", "unit"]);
    }

    #[test]
    fn test_passthrough_fields() {
        let tab = raw(json!({
            "slug": "a",
            "label": "A",
            "icon": "map",
            "content": {
                "primarySelect": "region",
                "secondarySelect": [],
                "dataSource": "census",
                "chart": { "kind": "bar" }
            }
        }));
        let out = normalize_tab(&tab).unwrap();
        assert_eq!(out.extra.get("icon"), Some(&json!("map")));
        assert_eq!(out.content.extra.get("dataSource"), Some(&json!("census")));
        assert_eq!(out.content.extra.get("chart"), Some(&json!({ "kind": "bar" })));

        let serialized = serde_json::to_value(&out).unwrap();
        assert_eq!(serialized["content"]["primarySelect"], json!([["region"]]));
        assert_eq!(serialized["content"]["chart"]["kind"], json!("bar"));
        assert_eq!(serialized["icon"], json!("map"));
    }

    #[test]
    fn test_normalized_is_independent_of_raw() {
        let mut tab = raw(json!({
            "slug": "a",
            "label": "A",
            "content": { "chart": { "kind": "bar" } }
        }));
        let mut out = normalize_tab(&tab).unwrap();

        out.content.extra.insert("chart".into(), json!("edited"));
        assert_eq!(tab.content.extra["chart"], json!({ "kind": "bar" }));

        tab.label = "changed".into();
        assert_eq!(out.label, "A");
    }

    #[test]
    fn test_invalid_secondary_propagates() {
        let tab = raw(json!({
            "slug": "a",
            "label": "A",
            "content": { "secondarySelect": ["year", ""] }
        }));
        let err = normalize_tab(&tab).unwrap_err();
        assert!(matches!(err, TabError::InvalidPath(_)));
    }

    #[test]
    fn test_find_tab_first_match() {
        let tabs = vec![
            raw(json!({ "slug": "a", "label": "first", "content": {} })),
            raw(json!({ "slug": "a", "label": "second", "content": {} })),
        ];
        assert_eq!(find_tab(&tabs, "a").unwrap().label, "first");
        assert!(find_tab(&tabs, "b").is_none());
    }
}
