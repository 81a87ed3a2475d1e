use crate::config::LayoutConfig;

/// Width of one character relative to the font size, calibrated against a
/// proportional sans-serif face.
pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.28,
        '(' | ')' | '[' | ']' | '{' | '}' | '/' | '\\' => 0.33,
        'i' | 'j' | 'l' | 'I' => 0.25,
        'f' | 't' | 'r' => 0.34,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        '@' | '#' | '%' | '&' => 0.946,
        '-' | '_' => 0.45,
        c if c.is_ascii_digit() => 0.6,
        c if c.is_ascii_uppercase() => 0.68,
        c if c.is_ascii_lowercase() => 0.56,
        c if is_wide(c) => 1.0,
        _ => 0.568,
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFF00..=0xFF60)
}

pub(super) fn text_width(text: &str, font_size: f32) -> f32 {
    text.trim().chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Unpadded block size for a node label; width grows with the label.
pub(super) fn block_size(label: &str, config: &LayoutConfig) -> (f32, f32) {
    let width = (text_width(label, config.font_size) + config.block_padding_x)
        .max(config.min_block_width);
    (width, config.block_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '\u{4e2d}', '\u{e9}'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }

    #[test]
    fn text_width_scales_with_font_size() {
        let w14 = text_width("Hello", 14.0);
        let w28 = text_width("Hello", 28.0);
        assert!((w28 - w14 * 2.0).abs() < 0.01, "width should double with font size");
    }

    #[test]
    fn short_labels_use_minimum_block() {
        let config = LayoutConfig::default();
        assert_eq!(block_size("a", &config), (config.min_block_width, config.block_height));
    }

    #[test]
    fn long_labels_grow_the_block() {
        let config = LayoutConfig::default();
        let (short, _) = block_size("short label here", &config);
        let (long, _) = block_size("a considerably longer neuron label than before", &config);
        assert!(long > short);
        assert!(long > config.min_block_width);
    }
}
