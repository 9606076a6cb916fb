use plotters::style::RGBColor;
use std::collections::HashMap;

/// Declared bounds for a named series. Either side may be absent, in which
/// case the data-derived value is kept. An entry with both sides absent
/// still marks the name as recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisOverride {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AxisOverride {
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

/// The whole static configuration surface: fallback names, axis overrides,
/// palette and chart geometry. Built once at startup and passed by
/// reference into every stage; nothing here is mutated after construction.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Positional fallback display names for columns whose declared name is
    /// missing or unrecognized.
    pub standard_names: Vec<String>,
    /// Per-display-name axis bounds. The key set doubles as the set of
    /// recognized column names.
    pub overrides: HashMap<String, AxisOverride>,
    /// Series colors, applied cyclically in column order.
    pub palette: Vec<RGBColor>,
    /// Chart title; `None` falls back to the input file's base name.
    pub title: Option<String>,
    /// Output image size in pixels.
    pub size: (u32, u32),
    pub grid: bool,
    pub legend: bool,
    /// strftime format for the X-axis labels.
    pub time_format: String,
    pub rotate_x_labels: bool,
    /// Horizontal pitch between stacked right-hand Y-axes, in pixels.
    pub axis_offset_px: i32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert("pH".to_string(), AxisOverride::new(Some(0.0), Some(14.0)));
        overrides.insert("µS/cm".to_string(), AxisOverride::new(Some(0.0), None));
        overrides.insert("FNU".to_string(), AxisOverride::new(Some(0.0), None));
        overrides.insert("°C".to_string(), AxisOverride::new(None, None));

        Self {
            standard_names: ["pH", "µS/cm", "FNU", "°C"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            overrides,
            palette: vec![
                RGBColor(0x1f, 0x77, 0xb4),
                RGBColor(0xd6, 0x27, 0x28),
                RGBColor(0x2c, 0xa0, 0x2c),
                RGBColor(0xff, 0x7f, 0x0e),
            ],
            title: None,
            size: (1280, 720),
            grid: true,
            legend: true,
            time_format: "%d.%m %H:%M".to_string(),
            rotate_x_labels: true,
            axis_offset_px: 60,
        }
    }
}
