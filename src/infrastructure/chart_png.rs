// Chart frame rendering with plotters. Every frame is drawn from scratch
// off the current projection; nothing from the previous frame survives.
use crate::domain::card::Card;
use crate::domain::chart::{ChartView, OUTPUT_AXIS_MAX, contiguous_runs};
use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tokio::sync::OnceCell;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 420;

pub struct ChartRenderer {
    width: u32,
    height: u32,
    backend_ready: OnceCell<()>,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            backend_ready: OnceCell::new(),
        }
    }

    /// Draw one frame for the card: the chart when there is data, otherwise
    /// the card's notice text. Returns encoded PNG bytes.
    pub async fn render(&self, card: &Card) -> Result<Vec<u8>> {
        // The backend must be ready before any drawing happens.
        self.ensure_backend().await?;
        match &card.chart {
            Some(view) => self.draw_chart(card, view),
            None => self.draw_notice(card),
        }
    }

    /// One-time backend probe, shared by every frame. A failed probe leaves
    /// the cell unset so the next frame tries again; drawing text exercises
    /// the font stack, the part that can be missing on a bare host.
    async fn ensure_backend(&self) -> Result<()> {
        self.backend_ready
            .get_or_try_init(|| async {
                let mut probe = vec![0u8; 8 * 8 * 3];
                {
                    let root = BitMapBackend::with_buffer(&mut probe, (8, 8)).into_drawing_area();
                    root.draw(&Text::new(
                        "x",
                        (0, 0),
                        ("sans-serif", 8).into_font().color(&BLACK),
                    ))
                    .map_err(|e| anyhow::anyhow!("chart backend unavailable: {}", e))?;
                }
                Ok::<(), anyhow::Error>(())
            })
            .await?;
        Ok(())
    }

    fn draw_chart(&self, card: &Card, view: &ChartView) -> Result<Vec<u8>> {
        let temp_file = frame_file();
        {
            let root =
                BitMapBackend::new(&temp_file, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow::anyhow!("failed to fill canvas: {}", e))?;

            let n = view.len();
            let x_max = n.saturating_sub(1).max(1) as f64;
            let labels = view.labels.clone();

            let mut chart = ChartBuilder::on(&root)
                .caption(&card.title, ("sans-serif", 22.0).into_font())
                .margin(12)
                .x_label_area_size(32)
                .y_label_area_size(48)
                .right_y_label_area_size(48)
                .build_cartesian_2d(0f64..x_max, view.left_min..view.left_max)
                .map_err(|e| anyhow::anyhow!("failed to build chart: {}", e))?
                .set_secondary_coord(0f64..x_max, 0f64..OUTPUT_AXIS_MAX);

            chart
                .configure_mesh()
                .x_labels(n.min(12))
                .x_label_formatter(&|x| {
                    let idx = x.round() as usize;
                    labels.get(idx).cloned().unwrap_or_default()
                })
                .x_desc("Time")
                .y_desc("Temperature")
                .draw()
                .map_err(|e| anyhow::anyhow!("failed to draw mesh: {}", e))?;

            // Scale only; the right axis draws no gridlines over the plot
            chart
                .configure_secondary_axes()
                .y_desc("Output %")
                .draw()
                .map_err(|e| anyhow::anyhow!("failed to draw output axis: {}", e))?;

            // Heater effort sits behind the temperature traces
            for run in contiguous_runs(&view.output) {
                let points = run.into_iter().map(|(i, v)| (i as f64, v));
                chart
                    .draw_secondary_series(
                        AreaSeries::new(points, 0.0, GREEN.mix(0.2)).border_style(&GREEN),
                    )
                    .map_err(|e| anyhow::anyhow!("failed to draw output series: {}", e))?;
            }

            for run in contiguous_runs(&view.target) {
                let points = run.into_iter().map(|(i, v)| (i as f64, v));
                chart
                    .draw_series(DashedLineSeries::new(points, 6, 4, RED.stroke_width(1)))
                    .map_err(|e| anyhow::anyhow!("failed to draw target series: {}", e))?;
            }

            for run in contiguous_runs(&view.current) {
                let points: Vec<(f64, f64)> =
                    run.into_iter().map(|(i, v)| (i as f64, v)).collect();
                chart
                    .draw_series(LineSeries::new(points, BLUE.stroke_width(2)))
                    .map_err(|e| anyhow::anyhow!("failed to draw temperature series: {}", e))?;
            }

            if let Some(indicator) = &card.indicator {
                root.draw(&Text::new(
                    indicator.clone(),
                    (60, 44),
                    ("sans-serif", 18).into_font().color(&BLACK),
                ))
                .map_err(|e| anyhow::anyhow!("failed to draw indicator: {}", e))?;
            }

            root.present()
                .map_err(|e| anyhow::anyhow!("failed to render chart: {}", e))?;
        }

        read_frame(&temp_file)
    }

    fn draw_notice(&self, card: &Card) -> Result<Vec<u8>> {
        let temp_file = frame_file();
        {
            let root =
                BitMapBackend::new(&temp_file, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow::anyhow!("failed to fill canvas: {}", e))?;

            if let Some(notice) = &card.notice {
                root.draw(&Text::new(
                    notice.clone(),
                    (40, (self.height / 2) as i32),
                    ("sans-serif", 20).into_font().color(&BLACK),
                ))
                .map_err(|e| anyhow::anyhow!("failed to draw notice: {}", e))?;
            }

            if let Some(indicator) = &card.indicator {
                root.draw(&Text::new(
                    indicator.clone(),
                    (40, 44),
                    ("sans-serif", 18).into_font().color(&BLACK),
                ))
                .map_err(|e| anyhow::anyhow!("failed to draw indicator: {}", e))?;
            }

            root.present()
                .map_err(|e| anyhow::anyhow!("failed to render notice: {}", e))?;
        }

        read_frame(&temp_file)
    }
}

fn frame_file() -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "kettle_chart_{}_{}.png",
        std::process::id(),
        chrono::Utc::now().timestamp_millis()
    ))
}

fn read_frame(path: &std::path::Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).context("failed to read chart file")?;
    let _ = std::fs::remove_file(path);
    Ok(bytes)
}
