//! Bar chart of a watchlist entry's interval history.

use crate::activity::Interval;
use std::fmt::Write;

pub const CANVAS_WIDTH: f64 = 300.0;
pub const CANVAS_HEIGHT: f64 = 180.0;
const BAR_GAP: f64 = 8.0;
const TOP_PADDING: f64 = 40.0;
const BASELINE_OFFSET: f64 = 30.0;
const BAR_COLOR: &str = "#4CAF50";
const TEXT_COLOR: &str = "#ffffff";
const TEXT_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub value: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    bars: Vec<Bar>,
    max: u64,
}

impl BarChart {
    /// Lays out one bar per interval; values beyond the known intervals are
    /// ignored. Heights scale to the largest value.
    pub fn new(history: &[u64]) -> Self {
        let values: Vec<(&'static str, u64)> = Interval::labels()
            .into_iter()
            .zip(history.iter().copied())
            .collect();
        let max = values.iter().map(|(_, v)| *v).max().unwrap_or(0);
        if values.is_empty() {
            return Self { bars: Vec::new(), max };
        }

        let width = CANVAS_WIDTH / values.len() as f64 - BAR_GAP;
        let bars = values
            .into_iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let height = if max == 0 {
                    0.0
                } else {
                    value as f64 / max as f64 * (CANVAS_HEIGHT - TOP_PADDING)
                };
                Bar {
                    label,
                    value,
                    x: i as f64 * (width + BAR_GAP),
                    y: CANVAS_HEIGHT - height - BASELINE_OFFSET,
                    width,
                    height,
                }
            })
            .collect();

        Self { bars, max }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = CANVAS_WIDTH,
            h = CANVAS_HEIGHT
        );
        for bar in &self.bars {
            let center = bar.x + bar.width / 2.0;
            let _ = writeln!(
                svg,
                r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                bar.x, bar.y, bar.width, bar.height, BAR_COLOR
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" fill="{}" font-size="12" text-anchor="middle">{}</text>"#,
                center,
                CANVAS_HEIGHT - 10.0,
                TEXT_COLOR,
                bar.label
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" fill="{}" font-size="12" text-anchor="middle">{}</text>"#,
                center,
                bar.y - 5.0,
                TEXT_COLOR,
                bar.value
            );
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// One line per bar, for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for bar in &self.bars {
            let filled = if self.max == 0 {
                0
            } else {
                (bar.value as f64 / self.max as f64 * TEXT_WIDTH as f64).round() as usize
            };
            let _ = writeln!(out, "{:>4} | {:<width$} {}", bar.label, "#".repeat(filled), bar.value, width = TEXT_WIDTH);
        }
        out
    }
}
