//! [§ 5.3 Replaced elements](https://www.w3.org/TR/css-images-3/#default-sizing)
//!
//! Sizing of `img` boxes.

/// [§ 5.3.1 The Default Sizing Algorithm](https://www.w3.org/TR/css-images-3/#default-sizing)
///
/// Target size of an image with the given intrinsic size and specified
/// `width`/`height` (0 meaning unset):
///
/// - both set: used as-is;
/// - one set: the other follows the intrinsic aspect ratio, rounded down;
/// - neither set: the intrinsic size.
///
/// Results are clamped to at least one pixel per axis.
#[must_use]
pub fn replaced_size(intrinsic: (u32, u32), width: i32, height: i32) -> (u32, u32) {
    let (iw, ih) = (u64::from(intrinsic.0.max(1)), u64::from(intrinsic.1.max(1)));
    let width = u64::try_from(width).unwrap_or(0);
    let height = u64::try_from(height).unwrap_or(0);
    let (w, h) = match (width, height) {
        (0, 0) => (iw, ih),
        (w, 0) => (w, w * ih / iw),
        (0, h) => (h * iw / ih, h),
        (w, h) => (w, h),
    };
    let clamp = |v: u64| u32::try_from(v).unwrap_or(u32::MAX).max(1);
    (clamp(w), clamp(h))
}
