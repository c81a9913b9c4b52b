//! Layout of a single student label.

use image::{imageops, Rgb, RgbImage};

use crate::config::{LayoutConfig, SCHOOL_TAG};
use crate::error::LabelError;
use crate::geometry::LabelGeometry;
use crate::qr::generate_qr_image;
use crate::style::{StyleProvider, TextStyle};

pub const ELLIPSIS: &str = "...";

/// Cursor offset below the top padding before the first line
const TEXT_TOP_OFFSET: u32 = 10;

/// Gaps after the name, first-name and e-mail lines
const NAME_GAP: u32 = 5;
const FIRST_NAME_GAP: u32 = 10;
const EMAIL_GAP: u32 = 15;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

// ============================================================================
// Student Record
// ============================================================================

/// The five fields printed on a label. Callers guarantee they are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub name: String,
    pub first_name: String,
    pub class_name: String,
    pub option: String,
    pub email: String,
}

impl StudentRecord {
    /// Build a record from raw form input, applying display normalization:
    /// upper-case name and class, capitalized first name.
    pub fn from_form(name: &str, first_name: &str, class_name: &str, option: &str, email: &str) -> Self {
        Self {
            name: name.trim().to_uppercase(),
            first_name: capitalize(first_name.trim()),
            class_name: class_name.trim().to_uppercase(),
            option: option.trim().to_string(),
            email: email.trim().to_string(),
        }
    }

    /// Name of the first empty field, if any.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("first name", &self.first_name),
            ("class", &self.class_name),
            ("option", &self.option),
            ("email", &self.email),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
    }
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Text Fitting
// ============================================================================

/// Number of characters to keep before appending an ellipsis so the line fits
/// in `max_width`.
///
/// Assumes every character has the same width (`measured_width / char_count`),
/// so the result is an estimate: proportional faces may still overshoot by a
/// few pixels.
pub fn estimate_truncated_length(char_count: usize, measured_width: u32, max_width: u32) -> usize {
    if measured_width == 0 {
        return char_count;
    }
    let fitting = (char_count as u64 * max_width as u64 / measured_width as u64) as usize;
    fitting.saturating_sub(ELLIPSIS.len())
}

/// Return `line` unchanged if it fits in `max_width`, otherwise an
/// estimated-length prefix followed by an ellipsis.
pub fn fit_line(styles: &dyn StyleProvider, style: TextStyle, line: &str, max_width: u32) -> String {
    let width = styles.measure(style, line).width();
    if width <= max_width {
        return line.to_string();
    }
    let keep = estimate_truncated_length(line.chars().count(), width, max_width);
    let mut fitted: String = line.chars().take(keep).collect();
    fitted.push_str(ELLIPSIS);
    fitted
}

// ============================================================================
// Label Renderer
// ============================================================================

pub struct LabelRenderer {
    geometry: LabelGeometry,
    styles: Box<dyn StyleProvider>,
    school_tag: String,
}

impl LabelRenderer {
    pub fn new(geometry: LabelGeometry, styles: Box<dyn StyleProvider>) -> Self {
        Self {
            geometry,
            styles,
            school_tag: SCHOOL_TAG.to_string(),
        }
    }

    pub fn from_config(config: &LayoutConfig, styles: Box<dyn StyleProvider>) -> Self {
        Self {
            geometry: LabelGeometry::from_config(config),
            styles,
            school_tag: config.school_tag.clone(),
        }
    }

    pub fn geometry(&self) -> &LabelGeometry {
        &self.geometry
    }

    /// The "class | option | school" line as it will be drawn.
    pub fn class_option_line(&self, record: &StudentRecord) -> String {
        let line = format!("{}  |  {}  |  {}", record.class_name, record.option, self.school_tag);
        fit_line(
            self.styles.as_ref(),
            TextStyle::ClassOption,
            &line,
            self.geometry.text_width(),
        )
    }

    /// Draw the label for `record`. Long text is truncated, never rejected;
    /// the only error is an e-mail too long to fit in a QR code.
    pub fn render(&self, record: &StudentRecord) -> Result<RgbImage, LabelError> {
        let geometry = &self.geometry;
        let mut label = RgbImage::from_pixel(geometry.width, geometry.height, WHITE);

        let x = geometry.padding_x as i32;
        let mut y = geometry.padding_y.saturating_add(TEXT_TOP_OFFSET) as i32;

        for (text, style, gap) in [
            (record.name.as_str(), TextStyle::Name, NAME_GAP),
            (record.first_name.as_str(), TextStyle::Name, FIRST_NAME_GAP),
            (record.email.as_str(), TextStyle::Email, EMAIL_GAP),
        ] {
            self.styles.draw(&mut label, style, x, y, text, BLACK);
            y += (self.styles.measure(style, text).height() + gap) as i32;
        }

        let class_line = self.class_option_line(record);
        self.styles.draw(&mut label, TextStyle::ClassOption, x, y, &class_line, BLACK);

        let qr = generate_qr_image(&record.email, geometry.qr_size)?;
        let (qr_x, qr_y) = geometry.qr_origin();
        imageops::replace(&mut label, &qr, qr_x, qr_y);

        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BitmapStyles, TextBounds};

    /// Every character is 10px wide and 20px tall.
    struct FixedAdvance;

    impl StyleProvider for FixedAdvance {
        fn measure(&self, _style: TextStyle, text: &str) -> TextBounds {
            TextBounds {
                left: 0,
                top: 0,
                right: 10 * text.chars().count() as i32,
                bottom: if text.is_empty() { 0 } else { 20 },
            }
        }

        fn draw(&self, _canvas: &mut RgbImage, _style: TextStyle, _x: i32, _y: i32, _text: &str, _color: Rgb<u8>) {}
    }

    fn sample_record() -> StudentRecord {
        StudentRecord {
            name: "DUPONT".to_string(),
            first_name: "Jean".to_string(),
            class_name: "6TTI".to_string(),
            option: "Informatique".to_string(),
            email: "jean.dupont@eduhainaut.be".to_string(),
        }
    }

    fn decode(img: &RgbImage) -> String {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            img.width() as usize,
            img.height() as usize,
            |x, y| img.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR code");
        grids[0].decode().expect("decodable QR code").1
    }

    #[test]
    fn form_input_is_normalized() {
        let record = StudentRecord::from_form(" dupont ", "jEAN", "6tti", "Informatique", "jean.dupont@eduhainaut.be");
        assert_eq!(record.name, "DUPONT");
        assert_eq!(record.first_name, "Jean");
        assert_eq!(record.class_name, "6TTI");
        assert_eq!(record.first_missing_field(), None);
    }

    #[test]
    fn reports_first_missing_field() {
        let record = StudentRecord::from_form("dupont", "jean", "  ", "", "x@y.z");
        assert_eq!(record.first_missing_field(), Some("class"));
    }

    #[test]
    fn capitalize_handles_unicode_and_empty() {
        assert_eq!(capitalize("éLODIE"), "Élodie");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn estimate_reserves_room_for_ellipsis() {
        assert_eq!(estimate_truncated_length(51, 1632, 786), 21);
        assert_eq!(estimate_truncated_length(10, 200, 100), 2);
        assert_eq!(estimate_truncated_length(4, 1000, 10), 0);
        assert_eq!(estimate_truncated_length(5, 0, 10), 5);
    }

    #[test]
    fn short_line_is_left_untouched() {
        let line = "6TTI  |  Info  |  LPETH";
        assert_eq!(fit_line(&FixedAdvance, TextStyle::ClassOption, line, 786), line);
        // exactly at the bound still fits
        let width = 10 * line.chars().count() as u32;
        assert_eq!(fit_line(&FixedAdvance, TextStyle::ClassOption, line, width), line);
    }

    #[test]
    fn long_line_is_truncated_with_ellipsis() {
        let line = "6TTI  |  ReallyLongOptionNameThatOverflows  |  LPETH";
        let fitted = fit_line(&FixedAdvance, TextStyle::ClassOption, line, 300);
        assert!(fitted.ends_with(ELLIPSIS));
        assert!(!fitted.contains("LPETH"));
        assert!(line.starts_with(fitted.trim_end_matches(ELLIPSIS)));
        assert!(FixedAdvance.measure(TextStyle::ClassOption, &fitted).width() <= 300);
    }

    #[test]
    fn truncated_line_estimate_stays_within_bound() {
        let styles = BitmapStyles::default();
        let line = "6TTI  |  ReallyLongOptionNameThatOverflows  |  LPETH";
        let max_width = 786;
        let fitted = fit_line(&styles, TextStyle::ClassOption, line, max_width);
        assert_eq!(fitted, "6TTI  |  ReallyLongOp...");
        let measured = styles.measure(TextStyle::ClassOption, line).width();
        let estimated = fitted.chars().count() as u32 * measured / line.chars().count() as u32;
        assert!(estimated <= max_width);
    }

    #[test]
    fn narrow_label_truncates_class_line() {
        let config = LayoutConfig {
            label_size_mm: (40.0, 37.0),
            ..LayoutConfig::default()
        };
        let renderer = LabelRenderer::from_config(&config, Box::new(FixedAdvance));
        let mut record = sample_record();
        record.option = "ReallyLongOptionNameThatOverflows".to_string();
        let line = renderer.class_option_line(&record);
        assert!(line.ends_with(ELLIPSIS));
        assert!(!line.contains("LPETH"));
    }

    #[test]
    fn label_has_configured_size_and_white_background() {
        let renderer = LabelRenderer::new(LabelGeometry::default(), Box::new(BitmapStyles::default()));
        let label = renderer.render(&sample_record()).unwrap();
        assert_eq!(label.dimensions(), (826, 437));
        assert_eq!(label.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(label.get_pixel(825, 436).0, [255, 255, 255]);
    }

    #[test]
    fn text_starts_below_top_padding() {
        let renderer = LabelRenderer::new(LabelGeometry::default(), Box::new(BitmapStyles::default()));
        let label = renderer.render(&sample_record()).unwrap();
        let first_dark_row = (0..label.height())
            .find(|&y| (0..label.width()).any(|x| label.get_pixel(x, y).0 != [255, 255, 255]))
            .unwrap();
        assert!(first_dark_row >= 20);
    }

    #[test]
    fn embedded_code_decodes_to_email() {
        let renderer = LabelRenderer::new(LabelGeometry::default(), Box::new(BitmapStyles::default()));
        let record = sample_record();
        let label = renderer.render(&record).unwrap();
        let (qr_x, qr_y) = renderer.geometry().qr_origin();
        let size = renderer.geometry().qr_size;
        let qr = imageops::crop_imm(&label, qr_x as u32, qr_y as u32, size, size).to_image();
        assert_eq!(decode(&qr), record.email);
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = LabelRenderer::new(LabelGeometry::default(), Box::new(BitmapStyles::default()));
        let record = sample_record();
        let first = renderer.render(&record).unwrap();
        let second = renderer.render(&record).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn truetype_long_line_is_truncated_within_bound() {
        let styles = crate::style::dejavu_sans();
        let line = "6TTI  |  ReallyLongOptionNameThatOverflows  |  LPETH";
        let max_width = LabelGeometry::default().text_width();
        assert!(styles.measure(TextStyle::ClassOption, line).width() > max_width);

        let fitted = fit_line(&styles, TextStyle::ClassOption, line, max_width);
        assert!(fitted.ends_with(ELLIPSIS));
        assert!(!fitted.contains("LPETH"));
        assert!(line.starts_with(&fitted[..fitted.len() - ELLIPSIS.len()]));
        assert!(styles.measure(TextStyle::ClassOption, &fitted).width() <= max_width);
    }

    #[test]
    fn truetype_short_line_is_kept() {
        let styles = crate::style::dejavu_sans();
        let line = "6TTI  |  Informatique  |  LPETH";
        let max_width = LabelGeometry::default().text_width();
        assert_eq!(fit_line(&styles, TextStyle::ClassOption, line, max_width), line);
    }

    #[test]
    fn truetype_label_keeps_text_clear_of_the_code() {
        let renderer = LabelRenderer::new(LabelGeometry::default(), Box::new(crate::style::dejavu_sans()));
        let record = sample_record();
        let label = renderer.render(&record).unwrap();
        let (qr_x, qr_y) = renderer.geometry().qr_origin();
        let size = renderer.geometry().qr_size;
        let qr = imageops::crop_imm(&label, qr_x as u32, qr_y as u32, size, size).to_image();
        assert_eq!(decode(&qr), record.email);

        let blank = |y: u32| (0..label.width()).all(|x| label.get_pixel(x, y).0 == [255, 255, 255]);
        assert!((0..20).all(blank), "ink above the first text line");
        assert!(!(20..qr_y as u32).all(blank), "no text drawn above the code");
    }

    #[test]
    fn renderer_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LabelRenderer>();

        let renderer = LabelRenderer::new(LabelGeometry::default(), Box::new(BitmapStyles::default()));
        let record = sample_record();
        let labels: Vec<RgbImage> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| scope.spawn(|| renderer.render(&record).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(labels[0].as_raw(), labels[1].as_raw());
    }

    #[test]
    fn oversized_text_never_fails() {
        let renderer = LabelRenderer::new(LabelGeometry::default(), Box::new(BitmapStyles::default()));
        let record = StudentRecord {
            name: "X".repeat(300),
            first_name: "Y".repeat(300),
            class_name: "Z".repeat(100),
            option: "O".repeat(100),
            email: format!("{}@eduhainaut.be", "e".repeat(80)),
        };
        assert!(renderer.render(&record).is_ok());
    }
}
