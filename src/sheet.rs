//! Placement of labels on the sheet grid.

use image::{imageops, Rgb, RgbImage};
use std::collections::BTreeMap;

use crate::config::FontSizes;
use crate::geometry::{GridPosition, SheetGeometry};
use crate::style::{BitmapStyles, StyleProvider, TextStyle};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Diagnostic grid colours and stroke widths
const CELL_OUTLINE: Rgb<u8> = Rgb([190, 190, 190]);
const CELL_OUTLINE_PX: u32 = 3;
const SELECTED_FILL: Rgb<u8> = Rgb([255, 236, 179]);
const SELECTED_OUTLINE: Rgb<u8> = Rgb([211, 47, 47]);
const SELECTED_OUTLINE_PX: u32 = 8;
const INDEX_COLOR: Rgb<u8> = Rgb([60, 60, 60]);
const INDEX_FONT_PX: f32 = 120.0;

pub struct SheetCompositor {
    geometry: SheetGeometry,
}

impl SheetCompositor {
    pub fn new(geometry: SheetGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &SheetGeometry {
        &self.geometry
    }

    /// White sheet with each label copied to its cell origin. Labels that
    /// extend past the sheet edge are clipped.
    pub fn compose(&self, placements: &BTreeMap<GridPosition, RgbImage>) -> RgbImage {
        let mut sheet = self.blank_sheet();
        for (&position, label) in placements {
            self.paste(&mut sheet, position, label);
        }
        sheet
    }

    /// Convenience for the usual single-label sheet.
    pub fn compose_single(&self, position: GridPosition, label: &RgbImage) -> RgbImage {
        let mut sheet = self.blank_sheet();
        self.paste(&mut sheet, position, label);
        sheet
    }

    fn blank_sheet(&self) -> RgbImage {
        RgbImage::from_pixel(self.geometry.width, self.geometry.height, WHITE)
    }

    fn paste(&self, sheet: &mut RgbImage, position: GridPosition, label: &RgbImage) {
        let (x, y) = self.geometry.origin_of(position);
        imageops::replace(sheet, label, x as i64, y as i64);
    }

    /// Preview of all cells with their indices, `selected` highlighted.
    /// Not meant for printing.
    pub fn render_grid(&self, selected: GridPosition) -> RgbImage {
        let g = &self.geometry;
        let mut canvas = self.blank_sheet();
        let digits = BitmapStyles::new(FontSizes {
            name: INDEX_FONT_PX,
            email: INDEX_FONT_PX,
            class_option: INDEX_FONT_PX,
        });

        for position in GridPosition::all() {
            let (x, y) = g.origin_of(position);
            if x >= g.width || y >= g.height {
                continue;
            }
            if position == selected {
                fill_rect(&mut canvas, x, y, g.label_width, g.label_height, SELECTED_FILL);
                stroke_rect(&mut canvas, x, y, g.label_width, g.label_height, SELECTED_OUTLINE_PX, SELECTED_OUTLINE);
            } else {
                stroke_rect(&mut canvas, x, y, g.label_width, g.label_height, CELL_OUTLINE_PX, CELL_OUTLINE);
            }

            let text = position.to_string();
            let bounds = digits.measure(TextStyle::Name, &text);
            let text_x = x as i64 + (g.label_width as i64 - bounds.width() as i64) / 2;
            let text_y = y as i64 + (g.label_height as i64 - bounds.height() as i64) / 2;
            if text_x < g.width as i64 && text_y < g.height as i64 {
                digits.draw(&mut canvas, TextStyle::Name, text_x as i32, text_y as i32, &text, INDEX_COLOR);
            }
        }

        canvas
    }
}

impl Default for SheetCompositor {
    fn default() -> Self {
        Self::new(SheetGeometry::default())
    }
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(canvas.width());
    let y_end = y.saturating_add(height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

/// Outline drawn inside the rectangle.
fn stroke_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, thickness: u32, color: Rgb<u8>) {
    let t = thickness.min(width).min(height);
    fill_rect(canvas, x, y, width, t, color);
    fill_rect(canvas, x, y.saturating_add(height - t), width, t, color);
    fill_rect(canvas, x, y, t, height, color);
    fill_rect(canvas, x.saturating_add(width - t), y, t, height, color);
}
