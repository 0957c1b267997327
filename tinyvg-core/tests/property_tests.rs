//! Property-based tests for decoder and renderer robustness.
//!
//! These tests use proptest to generate random documents and verify invariants.


use proptest::prelude::*;
use test_utils::*;
use tinyvg_core::*;

fn rect_document() -> impl Strategy<Value = Vec<u8>> {
    (
        1u8..=32,
        1u8..=32,
        prop::collection::vec(any::<[u8; 4]>(), 1..4),
        prop::collection::vec((0u8..32, 0u8..32, 0u8..32, 0u8..32), 0..6),
    )
        .prop_map(|(width, height, colors, rects)| {
            let count = colors.len() as u8;
            let mut builder = TvgBuilder::new(0, width, height, &colors);
            for (i, (x, y, w, h)) in rects.into_iter().enumerate() {
                builder = builder.fill_rect(i as u8 % count, x, y, w, h);
            }
            builder.finish()
        })
}

// ============================================================================
// Decoder Properties
// ============================================================================

/// Property: canonical documents re-encode to identical bytes
proptest! {
    #[test]
    fn prop_encode_restores_bytes(bytes in rect_document()) {
        let scene = parse(&bytes).unwrap();
        prop_assert_eq!(encode(&scene).unwrap(), bytes);
    }
}

/// Property: any strict prefix of a valid document is rejected as invalid
proptest! {
    #[test]
    fn prop_truncation_is_invalid(bytes in rect_document(), cut in 0usize..1000) {
        let length = cut % bytes.len();
        prop_assert_eq!(ErrorCode::of(&parse(&bytes[..length])), ErrorCode::InvalidData);
    }
}

/// Property: arbitrary bytes after a valid header never panic the decoder
proptest! {
    #[test]
    fn prop_garbage_body_never_panics(body in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut bytes = vec![0x72, 0x56, 0x01, 0x40, 16, 16];
        bytes.extend_from_slice(&body);
        let _ = parse(&bytes);
    }
}

// ============================================================================
// Renderer Properties
// ============================================================================

/// Property: rendering is deterministic and sized 4 * width * height
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]
    #[test]
    fn prop_bitmap_deterministic(bytes in rect_document(), width in 0u32..24, height in 0u32..24) {
        let scene = parse(&bytes).unwrap();
        let first = render_bitmap(&scene, AntiAlias::X4, width, height).unwrap();
        let second = render_bitmap(&scene, AntiAlias::X4, width, height).unwrap();
        prop_assert_eq!(first.pixels.len(), 4 * first.width as usize * first.height as usize);
        prop_assert_eq!(first, second);
    }
}

/// Property: every SVG document is closed and uses the canvas viewBox
proptest! {
    #[test]
    fn prop_svg_well_formed(bytes in rect_document()) {
        let scene = parse(&bytes).unwrap();
        let mut out = Vec::new();
        render_svg(&scene, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let view_box = format!("viewBox=\"0 0 {} {}\"", scene.width(), scene.height());
        prop_assert!(text.starts_with("<svg"));
        prop_assert!(text.contains(&view_box));
        prop_assert!(text.ends_with("</svg>\n"));
        prop_assert_eq!(text.matches("<rect").count(), scene.commands.len());
    }
}
