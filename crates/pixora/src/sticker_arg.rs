//! `--sticker SYMBOL@X,Y[:SIZE]` arguments.

use pixora_strip::{Point, StripStyle};

/// One sticker placed from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerArg {
    pub symbol: String,
    pub origin: Point,
    pub size: f32,
}

/// Parse `SYMBOL@X,Y` or `SYMBOL@X,Y:SIZE`.
///
/// The symbol may itself contain `@`; the last one separates it from
/// the position.
pub fn parse_sticker(s: &str) -> Result<StickerArg, String> {
    let (symbol, position) = s
        .rsplit_once('@')
        .ok_or_else(|| format!("sticker must be 'SYMBOL@X,Y[:SIZE]', got: '{s}'"))?;
    if symbol.is_empty() {
        return Err(format!("sticker symbol is empty in '{s}'"));
    }

    let (coords, size) = match position.split_once(':') {
        Some((coords, size)) => {
            let size: f32 = size
                .trim()
                .parse()
                .map_err(|e| format!("invalid sticker size '{size}': {e}"))?;
            if !(size > 0.0 && size.is_finite()) {
                return Err(format!("sticker size must be positive, got {size}"));
            }
            (coords, size)
        }
        None => (position, StripStyle::DEFAULT_STICKER_SIZE),
    };

    let (x_str, y_str) = coords
        .split_once(',')
        .ok_or_else(|| format!("sticker position must be 'X,Y', got: '{coords}'"))?;
    let x: f32 = x_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid sticker X '{x_str}': {e}"))?;
    let y: f32 = y_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid sticker Y '{y_str}': {e}"))?;

    Ok(StickerArg {
        symbol: symbol.to_owned(),
        origin: Point::new(x, y),
        size,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn position_only_uses_default_size() {
        let arg = parse_sticker("★@40,60").unwrap();
        assert_eq!(arg.symbol, "★");
        assert_eq!(arg.origin, Point::new(40.0, 60.0));
        assert!((arg.size - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn explicit_size_and_fractional_coordinates() {
        let arg = parse_sticker("\u{2764}\u{FE0F}@12.5, 300:48").unwrap();
        assert_eq!(arg.symbol, "\u{2764}\u{FE0F}");
        assert_eq!(arg.origin, Point::new(12.5, 300.0));
        assert!((arg.size - 48.0).abs() < f32::EPSILON);
    }

    #[test]
    fn symbol_may_contain_at_sign() {
        let arg = parse_sticker("@@1,2").unwrap();
        assert_eq!(arg.symbol, "@");
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        for bad in ["★", "@1,2", "★@1", "★@x,2", "★@1,2:0", "★@1,2:-4", "★@1,2:big"] {
            assert!(parse_sticker(bad).is_err(), "{bad:?} should fail");
        }
    }
}
