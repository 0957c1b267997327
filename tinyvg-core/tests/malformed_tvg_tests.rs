//! Malformed input tests.
//!
//! Every broken document must come back as an error with the right code,
//! never as a panic or a partially decoded scene.


use test_utils::*;
use tinyvg_core::*;

fn code_of(bytes: &[u8]) -> ErrorCode {
    ErrorCode::of(&parse(bytes))
}

// ============================================================================
// Truncation
// ============================================================================

#[test]
fn test_every_strict_prefix_is_invalid() {
    for length in 0..SHIELD.len() {
        assert_eq!(
            code_of(&SHIELD[..length]),
            ErrorCode::InvalidData,
            "prefix of {} bytes",
            length
        );
    }
    assert_eq!(code_of(&SHIELD), ErrorCode::Success);
}

#[test]
fn test_missing_end_marker() {
    let bytes = TvgBuilder::new(0, 8, 8, &[[0, 0, 0, 255]])
        .fill_rect(0, 0, 0, 4, 4)
        .unterminated();
    assert!(parse(&bytes).unwrap_err().is_invalid_data());
}

// ============================================================================
// Header
// ============================================================================

#[test]
fn test_bad_magic() {
    let mut bytes = SHIELD.to_vec();
    bytes[1] = 0x57;
    assert_eq!(code_of(&bytes), ErrorCode::InvalidData);
}

#[test]
fn test_unknown_version() {
    let mut bytes = SHIELD.to_vec();
    bytes[2] = 2;
    assert_eq!(code_of(&bytes), ErrorCode::InvalidData);
}

#[test]
fn test_reserved_coordinate_range() {
    let mut bytes = SHIELD.to_vec();
    bytes[3] |= 0xC0;
    assert_eq!(code_of(&bytes), ErrorCode::Unsupported);
}

#[test]
fn test_custom_color_encoding() {
    let mut bytes = SHIELD.to_vec();
    bytes[3] |= 0x30;
    assert_eq!(code_of(&bytes), ErrorCode::Unsupported);
    // The header alone is still readable.
    assert_eq!(
        probe_header(&bytes).unwrap().color_encoding,
        ColorEncoding::Custom
    );
}

// ============================================================================
// Body
// ============================================================================

#[test]
fn test_color_index_equal_to_table_length() {
    let bytes = TvgBuilder::new(0, 8, 8, &[[0, 0, 0, 255], [255, 0, 0, 255]])
        .fill_rect(2, 0, 0, 4, 4)
        .finish();
    assert_eq!(code_of(&bytes), ErrorCode::InvalidData);

    let bytes = TvgBuilder::new(0, 8, 8, &[[0, 0, 0, 255], [255, 0, 0, 255]])
        .fill_rect(1, 0, 0, 4, 4)
        .finish();
    assert_eq!(code_of(&bytes), ErrorCode::Success);
}

#[test]
fn test_empty_color_table() {
    // Accepted as long as no style refers to a color.
    let bytes = TvgBuilder::new(0, 8, 8, &[]).finish();
    let scene = parse(&bytes).unwrap();
    let bitmap = render_bitmap(&scene, AntiAlias::None, 0, 0).unwrap();
    assert!(bitmap.pixels.iter().all(|&b| b == 0));
    let mut svg = Vec::new();
    render_svg(&scene, &mut svg).unwrap();

    let bytes = TvgBuilder::new(0, 8, 8, &[]).fill_rect(0, 0, 0, 4, 4).finish();
    assert_eq!(code_of(&bytes), ErrorCode::InvalidData);
}

#[test]
fn test_unknown_command_tag() {
    let bytes = TvgBuilder::new(0, 8, 8, &[]).byte(0x0B).finish();
    assert_eq!(code_of(&bytes), ErrorCode::Unsupported);
}

#[test]
fn test_reserved_style_kind() {
    let bytes = TvgBuilder::new(0, 8, 8, &[[0, 0, 0, 255]])
        .bytes(&[0xC2, 0x00, 0x00, 0, 0, 1, 1])
        .finish();
    assert_eq!(code_of(&bytes), ErrorCode::Unsupported);
}

#[test]
fn test_oversized_var_uint() {
    // Color count with a sixth continuation byte.
    let bytes = [0x72, 0x56, 0x01, 0x40, 8, 8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
    assert_eq!(code_of(&bytes), ErrorCode::InvalidData);
}

#[test]
fn test_huge_counts_fail_without_allocating() {
    // 2^32 - 1 colors announced, none present.
    let bytes = [0x72, 0x56, 0x01, 0x40, 8, 8, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F];
    let options = ParseOptions {
        max_colors: usize::MAX,
        ..ParseOptions::default()
    };
    assert!(parse_with_options(&bytes, &options)
        .unwrap_err()
        .is_invalid_data());

    // fill_polygon announcing 2^28 points.
    let bytes = TvgBuilder::new(0, 8, 8, &[[0, 0, 0, 255]])
        .bytes(&[0x01, 0xFF, 0xFF, 0xFF, 0x7F, 0x00])
        .finish();
    assert_eq!(code_of(&bytes), ErrorCode::InvalidData);
}

#[test]
fn test_random_garbage_never_panics() {
    let mut state: u32 = 0x1234_5678;
    for _ in 0..512 {
        let mut bytes = SHIELD.to_vec();
        // xorshift
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let index = 4 + (state as usize % (SHIELD.len() - 4));
        bytes[index] = (state >> 24) as u8;
        let _ = parse(&bytes);
    }
}
