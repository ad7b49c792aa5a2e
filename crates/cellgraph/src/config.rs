use crate::Result;
use cellgraph_model::{ModelOptions, UndoOptions};
use cellgraph_view::ViewOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options for a [`crate::Graph`]. Every field is optional in the JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    pub model: ModelOptions,
    pub undo: UndoOptions,
    pub view: ViewOptions,
}

impl GraphConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let config = GraphConfig::from_json("{}").unwrap();
        assert_eq!(config, GraphConfig::default());
        assert_eq!(config.undo.size, 100);
        assert!(config.model.maintain_edge_parent);
        assert_eq!(config.view.scale, 1.0);
    }

    #[test]
    fn camel_case_keys() {
        let config = GraphConfig::from_value(json!({
            "model": { "maintainEdgeParent": false },
            "undo": { "size": 5 },
            "view": { "scale": 2.0, "translateX": 10.0, "defaultLoopStyle": "custom" }
        }))
        .unwrap();
        assert!(!config.model.maintain_edge_parent);
        assert!(config.model.create_ids);
        assert_eq!(config.undo.size, 5);
        assert_eq!(config.view.scale, 2.0);
        assert_eq!(config.view.translate_x, 10.0);
        assert_eq!(config.view.translate_y, 0.0);
        assert_eq!(config.view.default_loop_style, "custom");
    }

    #[test]
    fn serialized_form_parses_back() {
        let mut config = GraphConfig::default();
        config.view.font_size = 14.0;
        let value = config.to_value().unwrap();
        assert_eq!(value["view"]["fontSize"], json!(14.0));
        assert_eq!(GraphConfig::from_value(value).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = GraphConfig::from_json("{\"undo\": {\"size\": -1}}").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
