//! `catalog` subcommand: everything a front end needs to build its menus.

use chart_core::indicators::{Pane, Plot};
use chart_core::transform::CHART_GROUPS;
use chart_core::{ChartType, DrawingTool, IndicatorKey, Interval};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub timeframes: Vec<Timeframe>,
    pub chart_types: Vec<ChartGroup>,
    pub indicators: Vec<IndicatorEntry>,
    pub drawing_tools: Vec<ToolEntry>,
}

#[derive(Debug, Serialize)]
pub struct Timeframe {
    pub key: Interval,
    pub seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct ChartGroup {
    pub group: &'static str,
    pub items: Vec<ChartTypeEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChartTypeEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub supported: bool,
}

#[derive(Debug, Serialize)]
pub struct IndicatorEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub pane: Pane,
    pub plots: Vec<Plot>,
}

#[derive(Debug, Serialize)]
pub struct ToolEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub hotkey: Option<&'static str>,
    pub anchors: usize,
}

pub fn build() -> Catalog {
    Catalog {
        timeframes: Interval::SUPPORTED
            .iter()
            .map(|interval| Timeframe {
                key: *interval,
                seconds: interval.as_secs(),
            })
            .collect(),
        chart_types: CHART_GROUPS
            .iter()
            .map(|&(group, types)| ChartGroup {
                group,
                items: types.iter().map(chart_type_entry).collect(),
            })
            .collect(),
        indicators: IndicatorKey::ALL
            .iter()
            .map(|key| IndicatorEntry {
                key: key.key(),
                label: key.label(),
                pane: key.pane(),
                plots: key.plots().to_vec(),
            })
            .collect(),
        drawing_tools: DrawingTool::ALL
            .iter()
            .map(|tool| ToolEntry {
                key: tool.key(),
                label: tool.label(),
                hotkey: tool.hotkey(),
                anchors: tool.anchors_required(),
            })
            .collect(),
    }
}

fn chart_type_entry(chart_type: &ChartType) -> ChartTypeEntry {
    ChartTypeEntry {
        key: chart_type.key(),
        label: chart_type.label(),
        supported: chart_type.is_supported(),
    }
}
