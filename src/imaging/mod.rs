//! Per-image transformation: resizing, caption overlay, JPEG output.

pub mod calculations;
pub mod caption;
pub mod font;
pub mod transform;

pub use calculations::{caption_origin_y, fit_dimensions, line_height, relative_luminance};
pub use caption::draw_caption;
pub use font::FontHandle;
pub use transform::{
    ImagingError, JPEG_QUALITY, check_budget, decode, detect_format, encode, resize_to_fit,
};
