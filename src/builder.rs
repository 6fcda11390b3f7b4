//! ウィジェットビルダーの中核変換ロジック
//!
//! カラム式の合成、ウィジェットキー生成、チャート種別からのapp ID解決、
//! レイアウト正規化、ビルダー設定の組み立てを行う。
//! すべて純粋関数で、HTTPや入出力には依存しない。

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{
    BuilderConfigItem, BuilderConfigMetaData, BuilderConfigSource, BuilderConfigWith, LayoutItem,
    MetricMetadata, WITH_KEY_ATTRIBUTE_FILTER, WITH_KEY_SELECT_DATA_BY,
};

/// キー生成時に英数字以外を`_`へ置換するパターン
static KEY_SANITIZER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").unwrap());

/// レイアウトの最小幅（グリッド単位）
pub const MIN_LAYOUT_W: i64 = 4;
/// レイアウトの最小高さ（グリッド単位）
pub const MIN_LAYOUT_H: i64 = 6;

/// カラムに適用する集約メソッド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    Avg,
    Sum,
    Min,
    Max,
    #[default]
    #[serde(alias = "")]
    Any,
    Uniq,
    Count,
    Group,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Avg => "avg",
            AggregationMethod::Sum => "sum",
            AggregationMethod::Min => "min",
            AggregationMethod::Max => "max",
            AggregationMethod::Any => "any",
            AggregationMethod::Uniq => "uniq",
            AggregationMethod::Count => "count",
            AggregationMethod::Group => "group",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// カラムに適用するロールアップメソッド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollupMethod {
    Avg,
    Sum,
    Min,
    Max,
    Any,
    Uniq,
    Count,
    Group,
    #[default]
    #[serde(alias = "")]
    None,
}

impl RollupMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollupMethod::Avg => "avg",
            RollupMethod::Sum => "sum",
            RollupMethod::Min => "min",
            RollupMethod::Max => "max",
            RollupMethod::Any => "any",
            RollupMethod::Uniq => "uniq",
            RollupMethod::Count => "count",
            RollupMethod::Group => "group",
            RollupMethod::None => "none",
        }
    }
}

impl fmt::Display for RollupMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ツール入力のカラム設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(default)]
    pub aggregation_method: AggregationMethod,
    #[serde(default)]
    pub rollup_method: RollupMethod,
}

/// ツール入力のビルダー設定項目
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BuilderConfigItemInput {
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub source: Option<BuilderConfigSource>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub meta_data: Option<BuilderConfigMetaData>,
    #[serde(rename = "metricMetadata", default)]
    pub metric_metadata: Option<BTreeMap<String, MetricMetadata>>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub filter_with: Option<Value>,
}

/// ツール入力のレイアウト指定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LayoutItemInput {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default)]
    pub w: i64,
    #[serde(default)]
    pub h: i64,
    #[serde(default)]
    pub scope_id: i64,
}

/// カラム設定をクエリ式の文字列に変換する。
///
/// 集約が`any`または未指定なら名前をそのまま使い、ロールアップは無視。
/// ロールアップが`none`/`any`/未指定なら`agg(name)`、
/// それ以外は`agg(name, value(rollup))`となる。
pub fn transform_columns(columns: &[ColumnConfig]) -> Vec<String> {
    columns
        .iter()
        .map(|col| {
            if col.aggregation_method == AggregationMethod::Any {
                return col.name.clone();
            }

            match col.rollup_method {
                RollupMethod::None | RollupMethod::Any => {
                    format!("{}({})", col.aggregation_method, col.name)
                }
                rollup => format!("{}({}, value({}))", col.aggregation_method, col.name, rollup),
            }
        })
        .collect()
}

/// ラベルからウィジェットキーを生成する。
/// 英数字以外を`_`に置換して小文字化し、現在時刻のナノ秒由来のサフィックスを付ける。
pub fn generate_widget_key(label: &str) -> String {
    let cleaned = KEY_SANITIZER.replace_all(label, "_").to_lowercase();
    let random_id = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .rem_euclid(1_000_000_000);
    format!("{}_{}", cleaned, random_id)
}

/// チャート種別キーをウィジェットapp IDに解決する。未知の種別は1（時系列）。
pub fn widget_app_id(widget_type: &str) -> i64 {
    match widget_type {
        "time_series_chart" => 1,
        "bar_chart" => 2,
        "pie_chart" => 3,
        "scatter_plot" => 4,
        "data_table" => 5,
        "count_chart" => 7,
        "tree_chart" => 8,
        "top_list_chart" => 9,
        "heatmap_chart" => 10,
        "hexagon_chart" => 11,
        "query_value" => 12,
        _ => 1,
    }
}

/// レイアウト指定を正規化する。w/hは最小値を下回らないよう切り上げ、
/// x/yはそのまま通す。未指定なら既定の`{0, 0, 4, 6}`。
pub fn normalize_layout(input: Option<&LayoutItemInput>) -> LayoutItem {
    match input {
        Some(layout) => LayoutItem {
            x: layout.x,
            y: layout.y,
            w: layout.w.max(MIN_LAYOUT_W),
            h: layout.h.max(MIN_LAYOUT_H),
            scope_id: layout.scope_id,
            resize_handles: None,
        },
        None => LayoutItem {
            x: 0,
            y: 0,
            w: MIN_LAYOUT_W,
            h: MIN_LAYOUT_H,
            scope_id: 0,
            resize_handles: None,
        },
    }
}

/// ツール入力のビルダー設定をアップストリーム形式へ組み立てる。
///
/// group_byは`SELECT_DATA_BY`、filter_withは`ATTRIBUTE_FILTER`として
/// この順でwith句に入る。metricMetadataマップは先頭（キー昇順）の値だけを採用する。
pub fn build_config(input: &[BuilderConfigItemInput]) -> Vec<BuilderConfigItem> {
    input
        .iter()
        .map(|item| {
            let mut with_items = Vec::new();

            if !item.group_by.is_empty() {
                with_items.push(BuilderConfigWith {
                    key: WITH_KEY_SELECT_DATA_BY.to_string(),
                    value: Value::from(item.group_by.clone()),
                    is_arg: true,
                });
            }

            if let Some(filter) = &item.filter_with {
                with_items.push(BuilderConfigWith {
                    key: WITH_KEY_ATTRIBUTE_FILTER.to_string(),
                    value: filter.clone(),
                    is_arg: true,
                });
            }

            let metric_metadata = item
                .metric_metadata
                .as_ref()
                .and_then(|map| map.values().next().cloned());

            BuilderConfigItem {
                with: if with_items.is_empty() {
                    None
                } else {
                    Some(with_items)
                },
                columns: transform_columns(&item.columns),
                source: item.source.clone(),
                id: item.id.clone(),
                meta_data: item.meta_data.clone(),
                metric_metadata,
                key: item.key.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(name: &str, agg: AggregationMethod, rollup: RollupMethod) -> ColumnConfig {
        ColumnConfig {
            name: name.to_string(),
            aggregation_method: agg,
            rollup_method: rollup,
        }
    }

    #[test]
    fn test_transform_columns_with_rollup() {
        let columns = vec![column(
            "k8s.node.cpu.utilization",
            AggregationMethod::Avg,
            RollupMethod::Avg,
        )];
        assert_eq!(
            transform_columns(&columns),
            vec!["avg(k8s.node.cpu.utilization, value(avg))"]
        );
    }

    #[test]
    fn test_transform_columns_any_aggregation_is_bare() {
        // any集約ではロールアップ指定があっても無視される
        let columns = vec![
            column("body", AggregationMethod::Any, RollupMethod::None),
            column("timestamp", AggregationMethod::Any, RollupMethod::Sum),
        ];
        assert_eq!(transform_columns(&columns), vec!["body", "timestamp"]);
    }

    #[test]
    fn test_transform_columns_none_and_any_rollup() {
        let columns = vec![
            column("host.memory.usage", AggregationMethod::Sum, RollupMethod::None),
            column("host.memory.usage", AggregationMethod::Max, RollupMethod::Any),
        ];
        assert_eq!(
            transform_columns(&columns),
            vec!["sum(host.memory.usage)", "max(host.memory.usage)"]
        );
    }

    #[test]
    fn test_transform_columns_preserves_order_and_length() {
        let columns = vec![
            column("a", AggregationMethod::Avg, RollupMethod::None),
            column("b", AggregationMethod::Any, RollupMethod::None),
            column("c", AggregationMethod::Count, RollupMethod::Sum),
        ];
        assert_eq!(
            transform_columns(&columns),
            vec!["avg(a)", "b", "count(c, value(sum))"]
        );
    }

    #[test]
    fn test_transform_columns_empty() {
        assert!(transform_columns(&[]).is_empty());
    }

    #[test]
    fn test_column_config_accepts_empty_strings() {
        // 空文字はany/none（既定値）として読める
        let col: ColumnConfig = serde_json::from_value(json!({
            "name": "body",
            "aggregation_method": "",
            "rollup_method": ""
        }))
        .unwrap();
        assert_eq!(col.aggregation_method, AggregationMethod::Any);
        assert_eq!(col.rollup_method, RollupMethod::None);
    }

    #[test]
    fn test_column_config_defaults_when_absent() {
        let col: ColumnConfig = serde_json::from_value(json!({"name": "body"})).unwrap();
        assert_eq!(col.aggregation_method, AggregationMethod::Any);
        assert_eq!(col.rollup_method, RollupMethod::None);
    }

    #[test]
    fn test_generate_widget_key_slug() {
        let key = generate_widget_key("CPU Usage (prod)");
        let (slug, suffix) = key.rsplit_once('_').unwrap();
        assert_eq!(slug, "cpu_usage__prod_");
        let suffix: u64 = suffix.parse().unwrap();
        assert!(suffix < 1_000_000_000);
    }

    #[test]
    fn test_generate_widget_key_lowercases() {
        let key = generate_widget_key("ErrorRate");
        assert!(key.starts_with("errorrate_"));
    }

    #[test]
    fn test_widget_app_id_known_types() {
        assert_eq!(widget_app_id("time_series_chart"), 1);
        assert_eq!(widget_app_id("bar_chart"), 2);
        assert_eq!(widget_app_id("pie_chart"), 3);
        assert_eq!(widget_app_id("scatter_plot"), 4);
        assert_eq!(widget_app_id("data_table"), 5);
        assert_eq!(widget_app_id("count_chart"), 7);
        assert_eq!(widget_app_id("tree_chart"), 8);
        assert_eq!(widget_app_id("top_list_chart"), 9);
        assert_eq!(widget_app_id("heatmap_chart"), 10);
        assert_eq!(widget_app_id("hexagon_chart"), 11);
        assert_eq!(widget_app_id("query_value"), 12);
    }

    #[test]
    fn test_widget_app_id_unknown_falls_back() {
        assert_eq!(widget_app_id("sparkline"), 1);
        assert_eq!(widget_app_id(""), 1);
    }

    #[test]
    fn test_normalize_layout_clamps_minimums() {
        let layout = normalize_layout(Some(&LayoutItemInput {
            x: 2,
            y: 3,
            w: 2,
            h: 3,
            scope_id: 0,
        }));
        assert_eq!(layout.x, 2);
        assert_eq!(layout.y, 3);
        assert_eq!(layout.w, 4);
        assert_eq!(layout.h, 6);
    }

    #[test]
    fn test_normalize_layout_keeps_valid_sizes() {
        let layout = normalize_layout(Some(&LayoutItemInput {
            x: 0,
            y: 4,
            w: 8,
            h: 12,
            scope_id: 9,
        }));
        assert_eq!(layout.w, 8);
        assert_eq!(layout.h, 12);
        assert_eq!(layout.scope_id, 9);
    }

    #[test]
    fn test_normalize_layout_idempotent_and_floor() {
        // 最小値ちょうどの入力はそのまま
        let at_floor = normalize_layout(Some(&LayoutItemInput {
            x: 0,
            y: 0,
            w: MIN_LAYOUT_W,
            h: MIN_LAYOUT_H,
            scope_id: 0,
        }));
        assert_eq!((at_floor.w, at_floor.h), (4, 6));

        // 正規化済みの値を再度通しても変わらない
        let first = normalize_layout(Some(&LayoutItemInput {
            x: 1,
            y: 2,
            w: 3,
            h: 5,
            scope_id: 7,
        }));
        let again = normalize_layout(Some(&LayoutItemInput {
            x: first.x,
            y: first.y,
            w: first.w,
            h: first.h,
            scope_id: first.scope_id,
        }));
        assert_eq!(first, again);
    }

    #[test]
    fn test_normalize_layout_default() {
        let layout = normalize_layout(None);
        assert_eq!(layout, LayoutItem {
            x: 0,
            y: 0,
            w: 4,
            h: 6,
            scope_id: 0,
            resize_handles: None,
        });
    }

    #[test]
    fn test_build_config_with_order() {
        let input = vec![BuilderConfigItemInput {
            columns: vec![column(
                "k8s.node.cpu.utilization",
                AggregationMethod::Avg,
                RollupMethod::Avg,
            )],
            group_by: vec!["host.id".to_string()],
            filter_with: Some(json!({"and": [{"host.id": {"=": "ai-team2"}}]})),
            ..Default::default()
        }];

        let config = build_config(&input);
        assert_eq!(config.len(), 1);

        let with = config[0].with.as_ref().unwrap();
        assert_eq!(with.len(), 2);
        assert_eq!(with[0].key, "SELECT_DATA_BY");
        assert_eq!(with[0].value, json!(["host.id"]));
        assert!(with[0].is_arg);
        assert_eq!(with[1].key, "ATTRIBUTE_FILTER");
        assert!(with[1].is_arg);

        assert_eq!(
            config[0].columns,
            vec!["avg(k8s.node.cpu.utilization, value(avg))"]
        );
    }

    #[test]
    fn test_build_config_without_group_by_or_filter() {
        let input = vec![BuilderConfigItemInput {
            columns: vec![column("body", AggregationMethod::Any, RollupMethod::None)],
            ..Default::default()
        }];
        let config = build_config(&input);
        assert!(config[0].with.is_none());
    }

    #[test]
    fn test_build_config_filter_only() {
        let input = vec![BuilderConfigItemInput {
            filter_with: Some(json!({"or": []})),
            ..Default::default()
        }];
        let config = build_config(&input);
        let with = config[0].with.as_ref().unwrap();
        assert_eq!(with.len(), 1);
        assert_eq!(with[0].key, "ATTRIBUTE_FILTER");
    }

    #[test]
    fn test_build_config_metric_metadata_takes_first() {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "a.metric".to_string(),
            MetricMetadata {
                name: Some("a.metric".to_string()),
                ..Default::default()
            },
        );
        metadata.insert(
            "b.metric".to_string(),
            MetricMetadata {
                name: Some("b.metric".to_string()),
                ..Default::default()
            },
        );

        let input = vec![BuilderConfigItemInput {
            metric_metadata: Some(metadata),
            ..Default::default()
        }];
        let config = build_config(&input);
        assert_eq!(
            config[0].metric_metadata.as_ref().unwrap().name.as_deref(),
            Some("a.metric")
        );
    }

    #[test]
    fn test_build_config_passthrough_fields() {
        let input = vec![BuilderConfigItemInput {
            source: Some(BuilderConfigSource {
                name: "host".to_string(),
                alias: None,
                dataset_id: None,
            }),
            id: Some("c0ffee".to_string()),
            key: Some("item-key".to_string()),
            ..Default::default()
        }];
        let config = build_config(&input);
        assert_eq!(config[0].source.as_ref().unwrap().name, "host");
        assert_eq!(config[0].id.as_deref(), Some("c0ffee"));
        assert_eq!(config[0].key.as_deref(), Some("item-key"));
    }
}
