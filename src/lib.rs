//! student-labels: render student identification labels and place them on
//! an A4 label sheet.
//!
//! A [`LabelRenderer`] turns a [`StudentRecord`] into a label image (four text
//! lines and a QR code of the e-mail address); a [`SheetCompositor`] pastes
//! labels onto a 3x8 grid at 300 DPI.

pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod label;
pub mod qr;
pub mod sheet;
pub mod style;

pub use config::{FontSizes, LayoutConfig};
pub use error::LabelError;
pub use geometry::{GridPosition, LabelGeometry, SheetGeometry};
pub use label::{estimate_truncated_length, fit_line, LabelRenderer, StudentRecord};
pub use sheet::SheetCompositor;
pub use style::{resolve_styles, BitmapStyles, StyleProvider, TextBounds, TextStyle, TrueTypeStyles};
