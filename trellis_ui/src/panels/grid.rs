// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::geometry::{Rect, Size, sanitize_length};

use crate::widget::{ArrangeCx, Invalidate, MeasureCx, Widget};

/// Size of one grid track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridLength {
    /// Fixed size in pixels.
    Pixel(f64),
    /// Shrinks to the largest single-span child in the track.
    Auto,
    /// Weighted share of the space left after fixed and auto tracks.
    Star(f64),
}

impl GridLength {
    /// Parses `"Auto"`, `"*"`, `"2*"`, or a pixel count.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        if let Some(weight) = s.strip_suffix('*') {
            let weight = weight.trim();
            if weight.is_empty() {
                return Some(Self::Star(1.0));
            }
            return weight.parse().ok().filter(|w: &f64| *w >= 0.0).map(Self::Star);
        }
        s.parse().ok().filter(|v: &f64| *v >= 0.0).map(Self::Pixel)
    }

    /// Parses a comma-separated track list. Unparseable entries become
    /// `Star(1)`.
    #[must_use]
    pub fn parse_list(s: &str) -> Vec<Self> {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                Self::parse(t).unwrap_or_else(|| {
                    tracing::debug!(track = t, "unparseable grid track; using *");
                    Self::Star(1.0)
                })
            })
            .collect()
    }

    fn format(self) -> String {
        match self {
            Self::Pixel(v) => v.to_string(),
            Self::Auto => "Auto".to_owned(),
            Self::Star(w) if w == 1.0 => "*".to_owned(),
            Self::Star(w) => format!("{w}*"),
        }
    }
}

/// One child's footprint along one axis.
#[derive(Clone, Copy, Debug)]
struct Span {
    start: usize,
    count: usize,
    len: f64,
}

/// Resolves track sizes along one axis.
///
/// Pixel tracks are fixed, Auto tracks take the largest single-span child,
/// and Star tracks split whatever remains of `available` by weight. When
/// `available` is infinite, or `fill` is off, Star tracks are sized to their
/// content like Auto tracks.
fn resolve(defs: &[GridLength], available: f64, spans: &[Span], fill: bool) -> Vec<f64> {
    let content = |i: usize| {
        spans
            .iter()
            .filter(|s| s.count == 1 && s.start == i)
            .map(|s| s.len)
            .fold(0.0_f64, f64::max)
    };

    let mut sizes: Vec<f64> = defs
        .iter()
        .enumerate()
        .map(|(i, d)| match *d {
            GridLength::Pixel(v) => sanitize_length(v),
            GridLength::Auto => content(i),
            GridLength::Star(_) => 0.0,
        })
        .collect();

    let weight = |d: &GridLength| match *d {
        GridLength::Star(w) => sanitize_length(w),
        _ => 0.0,
    };
    let total_weight: f64 = defs.iter().map(weight).sum();
    let fixed: f64 = sizes.iter().sum();

    if fill && available.is_finite() && total_weight > 0.0 {
        let remaining = (available - fixed).max(0.0);
        for (size, d) in sizes.iter_mut().zip(defs) {
            if matches!(d, GridLength::Star(_)) {
                *size = remaining * weight(d) / total_weight;
            }
        }
    } else {
        for (i, d) in defs.iter().enumerate() {
            if matches!(d, GridLength::Star(_)) {
                sizes[i] = content(i);
            }
        }
    }
    sizes
}

/// Clamps a child's cell into the track list: `(start, count)`.
fn clamp_cell(start: usize, span: usize, tracks: usize) -> (usize, usize) {
    let start = start.min(tracks - 1);
    (start, span.max(1).min(tracks - start))
}

fn has_star(defs: &[GridLength], (start, count): (usize, usize)) -> bool {
    defs[start..start + count]
        .iter()
        .any(|d| matches!(d, GridLength::Star(_)))
}

fn spanned(sizes: &[f64], start: usize, count: usize) -> f64 {
    sizes[start..start + count].iter().sum()
}

/// Row and column layout with fixed, automatic, and proportional tracks.
///
/// An empty definition list behaves as a single `*` track.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    columns: Vec<GridLength>,
    rows: Vec<GridLength>,
}

impl Grid {
    /// A single-cell grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column tracks.
    #[must_use]
    pub fn with_columns(mut self, columns: impl Into<Vec<GridLength>>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Sets the row tracks.
    #[must_use]
    pub fn with_rows(mut self, rows: impl Into<Vec<GridLength>>) -> Self {
        self.rows = rows.into();
        self
    }

    /// Column tracks as written.
    #[must_use]
    pub fn columns(&self) -> &[GridLength] {
        &self.columns
    }

    /// Row tracks as written.
    #[must_use]
    pub fn rows(&self) -> &[GridLength] {
        &self.rows
    }

    fn tracks(defs: &[GridLength]) -> Vec<GridLength> {
        if defs.is_empty() {
            vec![GridLength::Star(1.0)]
        } else {
            defs.to_vec()
        }
    }
}

/// A child's resolved cell.
#[derive(Clone, Copy, Debug)]
struct Cell {
    col: (usize, usize),
    row: (usize, usize),
}

fn cell_of(props: &crate::tree::ControlProps, ncols: usize, nrows: usize) -> Cell {
    Cell {
        col: clamp_cell(props.grid_column, props.grid_column_span, ncols),
        row: clamp_cell(props.grid_row, props.grid_row_span, nrows),
    }
}

/// Constraint for a child spanning `range`: the sum of its tracks when they
/// are all pixel-sized or already resolved, otherwise unconstrained.
fn constraint(defs: &[GridLength], sizes: Option<&[f64]>, (start, count): (usize, usize)) -> f64 {
    let tracks = &defs[start..start + count];
    if let Some(sizes) = sizes {
        if !tracks.iter().any(|d| matches!(d, GridLength::Auto)) {
            return spanned(sizes, start, count);
        }
    }
    if tracks.iter().all(|d| matches!(d, GridLength::Pixel(_))) {
        tracks
            .iter()
            .map(|d| match *d {
                GridLength::Pixel(v) => sanitize_length(v),
                _ => 0.0,
            })
            .sum()
    } else {
        f64::INFINITY
    }
}

impl Widget for Grid {
    fn type_name(&self) -> &'static str {
        "Grid"
    }

    fn measure_override(&mut self, cx: &mut MeasureCx<'_>, available: Size) -> Size {
        let cols = Self::tracks(&self.columns);
        let rows = Self::tracks(&self.rows);

        let children = cx.children();
        let cells: Vec<Cell> = children
            .iter()
            .map(|&c| cell_of(cx.child_props(c), cols.len(), rows.len()))
            .collect();
        let mut desired = vec![Size::ZERO; children.len()];

        // Children outside star tracks size the auto tracks.
        for (i, (&child, cell)) in children.iter().zip(&cells).enumerate() {
            if has_star(&cols, cell.col) || has_star(&rows, cell.row) {
                continue;
            }
            let avail = Size::new(
                constraint(&cols, None, cell.col),
                constraint(&rows, None, cell.row),
            );
            desired[i] = cx.measure_child(child, avail);
        }

        let col_spans = spans(&cells, &desired, |c| c.col, |s| s.width);
        let row_spans = spans(&cells, &desired, |c| c.row, |s| s.height);
        let col_sizes = resolve(&cols, available.width, &col_spans, true);
        let row_sizes = resolve(&rows, available.height, &row_spans, true);

        // Star-spanning children get the provisional star space.
        for (i, (&child, cell)) in children.iter().zip(&cells).enumerate() {
            if !(has_star(&cols, cell.col) || has_star(&rows, cell.row)) {
                continue;
            }
            let w = if available.width.is_finite() {
                constraint(&cols, Some(&col_sizes), cell.col)
            } else {
                constraint(&cols, None, cell.col)
            };
            let h = if available.height.is_finite() {
                constraint(&rows, Some(&row_sizes), cell.row)
            } else {
                constraint(&rows, None, cell.row)
            };
            desired[i] = cx.measure_child(child, Size::new(w, h));
        }

        let col_spans = spans(&cells, &desired, |c| c.col, |s| s.width);
        let row_spans = spans(&cells, &desired, |c| c.row, |s| s.height);
        let width: f64 = resolve(&cols, available.width, &col_spans, false).iter().sum();
        let height: f64 = resolve(&rows, available.height, &row_spans, false).iter().sum();
        Size::new(width, height)
    }

    fn arrange_override(&mut self, cx: &mut ArrangeCx<'_>, content: Rect) {
        let cols = Self::tracks(&self.columns);
        let rows = Self::tracks(&self.rows);
        let children = cx.children();
        let cells: Vec<Cell> = children
            .iter()
            .map(|&c| cell_of(cx.child_props(c), cols.len(), rows.len()))
            .collect();
        let desired: Vec<Size> = children.iter().map(|&c| cx.desired_size(c)).collect();

        let col_spans = spans(&cells, &desired, |c| c.col, |s| s.width);
        let row_spans = spans(&cells, &desired, |c| c.row, |s| s.height);
        let col_sizes = resolve(&cols, content.width(), &col_spans, true);
        let row_sizes = resolve(&rows, content.height(), &row_spans, true);
        let col_offsets = offsets(&col_sizes);
        let row_offsets = offsets(&row_sizes);

        for (&child, cell) in children.iter().zip(&cells) {
            let (c, cn) = cell.col;
            let (r, rn) = cell.row;
            let x = content.x0 + col_offsets[c];
            let y = content.y0 + row_offsets[r];
            let rect = Rect::new(
                x,
                y,
                x + spanned(&col_sizes, c, cn),
                y + spanned(&row_sizes, r, rn),
            );
            cx.arrange_child(child, rect);
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        let list = |defs: &[GridLength]| {
            defs.iter()
                .map(|d| d.format())
                .collect::<Vec<_>>()
                .join(",")
        };
        Some(match name {
            "columns" | "columndefinitions" => list(&self.columns),
            "rows" | "rowdefinitions" => list(&self.rows),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        match name {
            "columns" | "columndefinitions" => self.columns = GridLength::parse_list(value),
            "rows" | "rowdefinitions" => self.rows = GridLength::parse_list(value),
            _ => return None,
        }
        Some(Invalidate::Measure)
    }
}

fn spans(
    cells: &[Cell],
    desired: &[Size],
    axis: impl Fn(&Cell) -> (usize, usize),
    len: impl Fn(Size) -> f64,
) -> Vec<Span> {
    cells
        .iter()
        .zip(desired)
        .map(|(cell, &d)| {
            let (start, count) = axis(cell);
            Span {
                start,
                count,
                len: len(d),
            }
        })
        .collect()
}

fn offsets(sizes: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    sizes
        .iter()
        .map(|s| {
            let o = acc;
            acc += s;
            o
        })
        .collect()
}
