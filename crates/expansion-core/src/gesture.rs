//! Stub gesture source: digit keys stand in for recognized hand signs and the
//! pointer stands in for hand position.

/// Domain key emitted for a keyboard key, if any.
#[inline]
pub fn domain_key_for_input(key: &str) -> Option<&'static str> {
    match key {
        "1" => Some("shrine"),
        "2" => Some("void"),
        "3" => Some("purple"),
        _ => None,
    }
}

/// Map a pointer position in viewport pixels to `[-1, 1]` on both axes, with
/// +y pointing up. A degenerate viewport maps to the center.
#[inline]
pub fn normalize_pointer(px: f32, py: f32, width: f32, height: f32) -> (f32, f32) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    let x = (px / width).clamp(0.0, 1.0) * 2.0 - 1.0;
    let y = -(py / height).clamp(0.0, 1.0) * 2.0 + 1.0;
    (x, y)
}
