use eframe::egui;

#[derive(Clone, Copy, Debug)]
pub struct Axis {
    pub min: f32,
    pub max: f32,
    pub log: bool,
}

impl Axis {
    pub fn linear(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            log: false,
        }
    }

    pub fn log(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            log: true,
        }
    }

    /// Position of `value` on the axis in `[0, 1]`, `None` if it cannot be
    /// placed (non-positive value on a log axis or an empty range).
    pub fn fraction(&self, value: f32) -> Option<f32> {
        let (value, min, max) = if self.log {
            if value <= 0.0 || self.min <= 0.0 {
                return None;
            }
            (value.log10(), self.min.log10(), self.max.log10())
        } else {
            (value, self.min, self.max)
        };

        let span = max - min;
        if span <= 0.0 || !span.is_finite() {
            return None;
        }
        Some(((value - min) / span).clamp(0.0, 1.0))
    }
}

/// Titled plot area with a dark background, returns the drawing rect.
pub fn plot_frame(ui: &mut egui::Ui, title: &str, height: f32) -> (egui::Rect, egui::Painter) {
    ui.label(title);

    let (response, painter) = ui.allocate_painter(
        egui::vec2(ui.available_width(), height),
        egui::Sense::hover(),
    );
    let rect = response.rect;
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(20));

    (rect, painter)
}

pub fn horizontal_line(painter: &egui::Painter, rect: egui::Rect, fraction: f32) {
    let y = rect.bottom() - fraction * rect.height();
    painter.line_segment(
        [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
        egui::Stroke::new(0.5, egui::Color32::from_gray(80)),
    );
}

pub fn trace(
    painter: &egui::Painter,
    rect: egui::Rect,
    xs: &[f32],
    ys: &[f32],
    x_axis: Axis,
    y_axis: Axis,
    color: egui::Color32,
) {
    let points: Vec<egui::Pos2> = xs
        .iter()
        .zip(ys)
        .filter_map(|(&x, &y)| {
            let fx = x_axis.fraction(x)?;
            let fy = y_axis.fraction(y)?;
            Some(egui::pos2(
                rect.left() + fx * rect.width(),
                rect.bottom() - fy * rect.height(),
            ))
        })
        .collect();

    if points.len() > 1 {
        painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, color)));
    }
}

/// Split `samples` into `columns` runs and return each run's (min, max).
pub fn min_max_columns(samples: &[f32], columns: usize) -> Vec<(f32, f32)> {
    if samples.is_empty() || columns == 0 {
        return Vec::new();
    }
    let per_column = samples.len().div_ceil(columns);
    samples
        .chunks(per_column)
        .map(|chunk| {
            chunk
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                    (lo.min(s), hi.max(s))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_axis_maps_and_clamps() {
        let axis = Axis::linear(-1.0, 1.0);
        assert_eq!(axis.fraction(0.0), Some(0.5));
        assert_eq!(axis.fraction(2.0), Some(1.0));
        assert_eq!(Axis::linear(1.0, 1.0).fraction(1.0), None);
    }

    #[test]
    fn log_axis_skips_dc_bin() {
        let axis = Axis::log(0.01, 10.0);
        assert_eq!(axis.fraction(0.0), None);
        assert!((axis.fraction(0.1).unwrap() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn min_max_columns_covers_all_samples() {
        let samples = [0.0, 1.0, -1.0, 0.5, 0.2];
        let columns = min_max_columns(&samples, 2);

        assert_eq!(columns, vec![(-1.0, 1.0), (0.2, 0.5)]);
        assert!(min_max_columns(&[], 10).is_empty());
    }
}
