//! Delivery URL optimization for CDN-hosted images.
//!
//! CDN delivery URLs look like
//! `https://res.cloudinary.com/<cloud>/image/upload/v123/file.jpg`. Inserting a
//! transformation segment after `/upload/` asks the CDN for an automatically
//! chosen format and quality without touching the stored original.

/// Host whose delivery URLs accept transformation segments.
const CDN_HOST: &str = "res.cloudinary.com";

/// Segment marking where transformations go.
const UPLOAD_SEGMENT: &str = "/upload/";

/// Format, quality, pixel-ratio, and progressive-JPEG transformations.
const BASE_TRANSFORM: &str = "f_auto,q_auto:good,dpr_auto,fl_progressive";

/// Rewrite a CDN delivery URL to request an optimized rendition.
///
/// `width` adds a downscale-only limit. Other URLs, and URLs that already
/// carry the optimization, are returned unchanged.
pub fn optimized_image_url(src: &str, width: Option<u32>) -> String {
    if !src.contains(CDN_HOST) {
        return src.to_string();
    }
    let Some((prefix, rest)) = src.split_once(UPLOAD_SEGMENT) else {
        return src.to_string();
    };
    if rest.is_empty() || rest.starts_with(BASE_TRANSFORM) {
        return src.to_string();
    }

    let transform = match width {
        Some(w) if w > 0 => format!("{BASE_TRANSFORM},c_limit,w_{w}"),
        _ => BASE_TRANSFORM.to_string(),
    };

    format!("{prefix}{UPLOAD_SEGMENT}{transform}/{rest}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "https://res.cloudinary.com/demo/image/upload/v1700000000/nwuian/cover.jpg";

    #[test]
    fn inserts_transform() {
        assert_eq!(
            optimized_image_url(SRC, None),
            "https://res.cloudinary.com/demo/image/upload/f_auto,q_auto:good,dpr_auto,fl_progressive/v1700000000/nwuian/cover.jpg"
        );
    }

    #[test]
    fn adds_width_limit() {
        assert!(
            optimized_image_url(SRC, Some(800))
                .contains("/upload/f_auto,q_auto:good,dpr_auto,fl_progressive,c_limit,w_800/v17")
        );
    }

    #[test]
    fn never_applied_twice() {
        let once = optimized_image_url(SRC, Some(800));
        assert_eq!(optimized_image_url(&once, Some(800)), once);
        assert_eq!(optimized_image_url(&once, None), once);
    }

    #[test]
    fn other_urls_unchanged() {
        assert_eq!(
            optimized_image_url("/files/2026/10/a.png", Some(800)),
            "/files/2026/10/a.png"
        );
        assert_eq!(
            optimized_image_url("https://example.com/upload/a.png", None),
            "https://example.com/upload/a.png"
        );
        assert_eq!(optimized_image_url("", None), "");
    }
}
