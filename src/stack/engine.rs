use std::rc::Rc;

use chrono::Duration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chart::Chart;
use crate::core::accessor::{TitleAccessor, ValueAccessor, default_title_accessor};
use crate::core::key::Key;
use crate::data::SharedGroup;
use crate::error::{ChartError, ChartResult};
use crate::render::LegendItem;
use crate::stack::layer::{Layer, StackPoint};

/// One re-keyed row of the wide table fed to the stacking function:
/// a canonical key plus each visible layer's value at that key.
#[derive(Debug, Clone, PartialEq)]
pub struct StackRow {
    pub x: Key,
    pub ys: Vec<Option<f64>>,
}

/// Pluggable stacking: maps the wide table to, per layer, per row, a
/// `(y0, y1)` baseline pair.
pub type StackFunction = Rc<dyn Fn(&[StackRow]) -> Vec<Vec<(f64, f64)>>>;

/// Baseline stacking with diverging sign handling: positive values stack
/// upward from the previous positive top, negative values downward from the
/// previous negative bottom. `y1 = y0 + y` always holds.
#[must_use]
pub fn default_stack_function() -> StackFunction {
    Rc::new(|rows: &[StackRow]| {
        let layer_count = rows.first().map_or(0, |row| row.ys.len());
        let mut series: Vec<Vec<(f64, f64)>> = (0..layer_count)
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        for row in rows {
            let mut positive_base = 0.0;
            let mut negative_base = 0.0;
            for (layer_index, y) in row.ys.iter().enumerate() {
                let value = y.unwrap_or(0.0);
                let pair = if value >= 0.0 {
                    let pair = (positive_base, positive_base + value);
                    positive_base += value;
                    pair
                } else {
                    let pair = (negative_base, negative_base + value);
                    negative_base += value;
                    pair
                };
                series[layer_index].push(pair);
            }
        }
        series
    })
}

/// Axis-extent widening: a plain amount or a percentage of the extent.
/// For date-keyed x extents an amount is interpreted as whole-or-fractional
/// days; a percentage leaves date extents unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AxisPadding {
    Amount(f64),
    Percent(f64),
}

impl Default for AxisPadding {
    fn default() -> Self {
        Self::Amount(0.0)
    }
}

impl AxisPadding {
    #[must_use]
    pub fn widen_above(self, value: f64) -> f64 {
        match self {
            Self::Amount(amount) => value + amount,
            Self::Percent(percent) => value + value.abs() * percent / 100.0,
        }
    }

    #[must_use]
    pub fn widen_below(self, value: f64) -> f64 {
        match self {
            Self::Amount(amount) => value - amount,
            Self::Percent(percent) => value - value.abs() * percent / 100.0,
        }
    }
}

pub(crate) struct StackState {
    pub(crate) layers: Vec<Layer>,
    pub(crate) hidable: bool,
    pub(crate) evade_domain_filter: bool,
    pub(crate) titles: IndexMap<String, TitleAccessor>,
    pub(crate) default_title: TitleAccessor,
    pub(crate) stack_fn: StackFunction,
    pub(crate) y_padding: AxisPadding,
    pub(crate) x_padding: AxisPadding,
}

impl Default for StackState {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            hidable: false,
            evade_domain_filter: false,
            titles: IndexMap::new(),
            default_title: default_title_accessor(),
            stack_fn: default_stack_function(),
            y_padding: AxisPadding::default(),
            x_padding: AxisPadding::default(),
        }
    }
}

/// Deterministic export of a chart's stacked data, for debugging and golden
/// tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataSnapshot {
    pub chart_id: u64,
    pub anchor: String,
    pub layers: Vec<LayerSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub name: String,
    pub hidden: bool,
    pub points: Vec<StackPoint>,
}

impl Chart {
    /// Appends a stacked layer over `group`.
    ///
    /// `name` defaults to the layer's positional index rendered as a
    /// string; names must be unique because they key titles, hide/show,
    /// and legend toggling. `accessor` overrides the chart-wide value
    /// accessor for this layer only.
    pub fn stack(
        &mut self,
        group: SharedGroup,
        name: Option<&str>,
        accessor: Option<ValueAccessor>,
    ) -> ChartResult<()> {
        let name = name.map_or_else(|| self.stacking.layers.len().to_string(), str::to_owned);
        if self.stacking.layers.iter().any(|layer| layer.name() == name) {
            return Err(ChartError::InvalidData(format!(
                "stack layer `{name}` is already defined"
            )));
        }
        debug!(chart_id = self.id(), layer = %name, "added stack layer");
        self.stacking.layers.push(Layer::new(group, name, accessor));
        Ok(())
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.stacking.layers
    }

    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.stacking.layers.iter().find(|layer| layer.name() == name)
    }

    #[must_use]
    pub fn stack_names(&self) -> Vec<&str> {
        self.stacking.layers.iter().map(Layer::name).collect()
    }

    #[must_use]
    pub fn hidable_stacks(&self) -> bool {
        self.stacking.hidable
    }

    pub fn set_hidable_stacks(&mut self, hidable: bool) {
        self.stacking.hidable = hidable;
    }

    pub fn hide_stack(&mut self, name: &str) {
        self.set_stack_hidden(name, true);
    }

    pub fn show_stack(&mut self, name: &str) {
        self.set_stack_hidden(name, false);
    }

    fn set_stack_hidden(&mut self, name: &str, hidden: bool) {
        match self
            .stacking
            .layers
            .iter_mut()
            .find(|layer| layer.name() == name)
        {
            Some(layer) => layer.set_hidden(hidden),
            None => trace!(layer = name, "ignoring visibility toggle for unknown stack"),
        }
    }

    #[must_use]
    pub fn evade_domain_filter(&self) -> bool {
        self.stacking.evade_domain_filter
    }

    /// Disables domain clipping entirely so the out-of-domain neighbor of a
    /// partially visible line or bar still reaches the drawing
    /// collaborator.
    pub fn set_evade_domain_filter(&mut self, evade: bool) {
        self.stacking.evade_domain_filter = evade;
    }

    pub fn set_stack_function(&mut self, stack_fn: StackFunction) {
        self.stacking.stack_fn = stack_fn;
    }

    #[must_use]
    pub fn y_axis_padding(&self) -> AxisPadding {
        self.stacking.y_padding
    }

    pub fn set_y_axis_padding(&mut self, padding: AxisPadding) {
        self.stacking.y_padding = padding;
    }

    #[must_use]
    pub fn x_axis_padding(&self) -> AxisPadding {
        self.stacking.x_padding
    }

    pub fn set_x_axis_padding(&mut self, padding: AxisPadding) {
        self.stacking.x_padding = padding;
    }

    /// Resolves the title accessor for `stack_name`, falling back to the
    /// chart-wide default; `None` resolves the default itself.
    #[must_use]
    pub fn title(&self, stack_name: Option<&str>) -> TitleAccessor {
        stack_name
            .and_then(|name| self.stacking.titles.get(name))
            .map_or_else(
                || Rc::clone(&self.stacking.default_title),
                Rc::clone,
            )
    }

    /// Sets the title accessor for one layer, or the chart-wide default
    /// when `stack_name` is `None`.
    pub fn set_title(&mut self, stack_name: Option<&str>, title: TitleAccessor) {
        match stack_name {
            Some(name) => {
                self.stacking.titles.insert(name.to_owned(), title);
            }
            None => self.stacking.default_title = title,
        }
    }

    /// One legend entry per layer, hidden layers included and flagged,
    /// carrying the layer's resolved color.
    #[must_use]
    pub fn legendables(&self) -> Vec<LegendItem> {
        self.stacking
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| LegendItem {
                name: layer.name().to_owned(),
                hidden: layer.hidden(),
                color: self.layer_color(index).to_owned(),
            })
            .collect()
    }

    /// Legend toggle: when hidable stacks are enabled, flips the named
    /// layer's hidden flag and returns `true`, meaning the host must ask
    /// the registry for a group-wide full render. Hiding a layer changes
    /// the data shape, not just filter state.
    pub fn legend_toggle(&mut self, name: &str) -> bool {
        if !self.stacking.hidable {
            return false;
        }
        let chart_id = self.id();
        let Some(layer) = self
            .stacking
            .layers
            .iter_mut()
            .find(|layer| layer.name() == name)
        else {
            trace!(layer = name, "ignoring legend toggle for unknown stack");
            return false;
        };
        let hidden = !layer.hidden();
        layer.set_hidden(hidden);
        debug!(chart_id, layer = name, hidden, "legend toggled stack");
        true
    }

    /// Computes the chart's stacked data.
    ///
    /// Recomputes every derived field (`values`, `domain_values`, `y0`,
    /// `y1`) from the aggregation sources and returns the visible layers,
    /// baseline-positioned, in stack order.
    pub fn data(&mut self) -> ChartResult<Vec<Layer>> {
        let visible_indices: Vec<usize> = self
            .stacking
            .layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| !layer.hidden())
            .map(|(index, _)| index)
            .collect();
        if visible_indices.is_empty() {
            for layer in &mut self.stacking.layers {
                layer.values.clear();
                layer.domain_values.clear();
            }
            return Ok(Vec::new());
        }

        let key_accessor = self.key_accessor();
        let default_value = self.value_accessor();
        let evade = self.stacking.evade_domain_filter;
        let x_scale = self.x().cloned();
        let clip = x_scale
            .as_ref()
            .is_some_and(|scale| !scale.is_ordinal() && !scale.is_elastic());

        // Per-record tuples for every layer; hidden layers carry `y = None`
        // so they keep participating in re-keying.
        for layer in &mut self.stacking.layers {
            let accessor = layer
                .accessor()
                .map_or_else(|| Rc::clone(&default_value), Rc::clone);
            let hidden = layer.hidden();
            let name = layer.name().to_owned();
            let rows = layer.group().borrow().all();
            let all_points: Vec<StackPoint> = rows
                .into_iter()
                .map(|row| StackPoint {
                    x: key_accessor(&row),
                    y: if hidden { None } else { Some(accessor(&row)) },
                    y0: 0.0,
                    y1: 0.0,
                    layer: name.clone(),
                    hidden,
                    data: row,
                })
                .collect();
            let domain_values: Vec<StackPoint> = if clip {
                all_points
                    .iter()
                    .filter(|point| {
                        x_scale
                            .as_ref()
                            .is_some_and(|scale| scale.contains(&point.x))
                    })
                    .cloned()
                    .collect()
            } else {
                all_points.clone()
            };
            layer.values = if evade { all_points } else { domain_values.clone() };
            layer.domain_values = domain_values;
        }

        // Canonical key sequence: the first visible layer's x ordering.
        let first_visible = visible_indices[0];
        let canonical: Vec<Key> = self.stacking.layers[first_visible]
            .values
            .iter()
            .map(|point| point.x.clone())
            .collect();
        for layer in &self.stacking.layers {
            self.validate_key_sequence(layer, &canonical)?;
        }

        let wide_rows: Vec<StackRow> = canonical
            .iter()
            .enumerate()
            .map(|(row_index, key)| StackRow {
                x: key.clone(),
                ys: visible_indices
                    .iter()
                    .map(|&layer_index| self.stacking.layers[layer_index].values[row_index].y)
                    .collect(),
            })
            .collect();

        // An empty key set has nothing to stack; the wide table carries no
        // layer-count information either.
        let stacked = if canonical.is_empty() {
            vec![Vec::new(); visible_indices.len()]
        } else {
            (self.stacking.stack_fn)(&wide_rows)
        };
        if stacked.len() != visible_indices.len() {
            return Err(ChartError::InvalidData(format!(
                "stack function produced {} series for {} visible layers",
                stacked.len(),
                visible_indices.len()
            )));
        }

        for (series_index, &layer_index) in visible_indices.iter().enumerate() {
            let series = &stacked[series_index];
            let layer = &mut self.stacking.layers[layer_index];
            if series.len() != layer.values.len() {
                return Err(ChartError::InvalidData(format!(
                    "stack function produced {} rows for layer `{}` with {} points",
                    series.len(),
                    layer.name(),
                    layer.values.len()
                )));
            }
            for (point, &(y0, y1)) in layer.values.iter_mut().zip(series) {
                point.y0 = y0;
                point.y1 = y1;
            }
            // Rebuild the clipped view so it carries the baselines too.
            layer.domain_values = if clip {
                layer
                    .values
                    .iter()
                    .filter(|point| {
                        x_scale
                            .as_ref()
                            .is_some_and(|scale| scale.contains(&point.x))
                    })
                    .cloned()
                    .collect()
            } else {
                layer.values.clone()
            };
        }

        let result: Vec<Layer> = visible_indices
            .iter()
            .map(|&index| self.stacking.layers[index].clone())
            .collect();
        trace!(
            chart_id = self.id(),
            layer_count = result.len(),
            key_count = canonical.len(),
            "stacked chart data computed"
        );
        Ok(result)
    }

    fn validate_key_sequence(&self, layer: &Layer, canonical: &[Key]) -> ChartResult<()> {
        if layer.values.len() != canonical.len() {
            return Err(ChartError::LayerKeyMismatch {
                layer: layer.name().to_owned(),
                index: layer.values.len().min(canonical.len()),
                expected: format!("{} keys", canonical.len()),
                found: format!("{} keys", layer.values.len()),
            });
        }
        for (index, (point, expected)) in layer.values.iter().zip(canonical).enumerate() {
            if &point.x != expected {
                return Err(ChartError::LayerKeyMismatch {
                    layer: layer.name().to_owned(),
                    index,
                    expected: expected.to_string(),
                    found: point.x.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Lower y extent over the visible layers' in-domain points, widened by
    /// the y padding. `None` when no visible data exists.
    pub fn y_axis_min(&mut self) -> ChartResult<Option<f64>> {
        let layers = self.data()?;
        let mut min: Option<f64> = None;
        for point in layers.iter().flat_map(|layer| layer.domain_values()) {
            let Some(y) = point.y else { continue };
            let candidate = if y < 0.0 { y + point.y0 } else { point.y0 };
            min = Some(min.map_or(candidate, |current| current.min(candidate)));
        }
        Ok(min.map(|value| self.stacking.y_padding.widen_below(value)))
    }

    /// Upper y extent over the visible layers' in-domain points, widened by
    /// the y padding. `None` when no visible data exists.
    pub fn y_axis_max(&mut self) -> ChartResult<Option<f64>> {
        let layers = self.data()?;
        let mut max: Option<f64> = None;
        for point in layers.iter().flat_map(|layer| layer.domain_values()) {
            let Some(y) = point.y else { continue };
            let candidate = if y > 0.0 { y + point.y0 } else { point.y0 };
            max = Some(max.map_or(candidate, |current| current.max(candidate)));
        }
        Ok(max.map(|value| self.stacking.y_padding.widen_above(value)))
    }

    /// Smallest x key over the visible layers' in-domain points, widened by
    /// the x padding where the key variant allows it.
    pub fn x_axis_min(&mut self) -> ChartResult<Option<Key>> {
        let layers = self.data()?;
        let min = layers
            .iter()
            .flat_map(|layer| layer.domain_values())
            .map(|point| &point.x)
            .min()
            .cloned();
        Ok(min.map(|key| self.pad_x_key(key, false)))
    }

    /// Largest x key over the visible layers' in-domain points, widened by
    /// the x padding where the key variant allows it.
    pub fn x_axis_max(&mut self) -> ChartResult<Option<Key>> {
        let layers = self.data()?;
        let max = layers
            .iter()
            .flat_map(|layer| layer.domain_values())
            .map(|point| &point.x)
            .max()
            .cloned();
        Ok(max.map(|key| self.pad_x_key(key, true)))
    }

    fn pad_x_key(&self, key: Key, above: bool) -> Key {
        let padding = self.stacking.x_padding;
        match (key, padding) {
            (Key::Num(value), padding) => {
                let padded = if above {
                    padding.widen_above(value.0)
                } else {
                    padding.widen_below(value.0)
                };
                Key::num(padded)
            }
            (Key::Date(date), AxisPadding::Amount(days)) => {
                let delta = Duration::milliseconds((days * 86_400_000.0) as i64);
                Key::date(if above { date + delta } else { date - delta })
            }
            (key, _) => key,
        }
    }

    /// Deterministic snapshot of the visible stacked layers.
    pub fn data_snapshot(&mut self) -> ChartResult<ChartDataSnapshot> {
        let layers = self.data()?;
        Ok(ChartDataSnapshot {
            chart_id: self.id(),
            anchor: self.anchor().to_owned(),
            layers: layers
                .iter()
                .map(|layer| LayerSnapshot {
                    name: layer.name().to_owned(),
                    hidden: layer.hidden(),
                    points: layer.values().to_vec(),
                })
                .collect(),
        })
    }

    pub fn data_snapshot_json(&mut self) -> ChartResult<String> {
        let snapshot = self.data_snapshot()?;
        serde_json::to_string_pretty(&snapshot)
            .map_err(|err| ChartError::InvalidData(format!("snapshot serialization failed: {err}")))
    }
}
