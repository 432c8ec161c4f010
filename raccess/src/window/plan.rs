use super::geometry::WindowGeometry;
use crate::error::WindowError;

/// 一批序列共享的窗口化计划
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    /// 是否有序列超过窗口长度
    pub windowed: bool,
    /// 批内所有序列统一编码到的长度
    pub padded_len: usize,
}

/// 根据批内最长序列长度决定是否窗口化以及统一的填充长度。
///
/// - `max_len <= W`：不需要窗口化，填充到 W。
/// - 否则 `k = 1 + (max_len - (W - 2T)) / S`，填充到 `W + k * S`。
///
/// `k` 只是窗口数的上界估计，真正的窗口数由 [`window_count`] 从填充长度算出。
pub fn plan(max_len: usize, geom: &WindowGeometry) -> WindowPlan {
    let w = geom.window();
    if max_len <= w {
        return WindowPlan { windowed: false, padded_len: w };
    }
    // W - 2T == S <= W < max_len，不会下溢
    let k = 1 + (max_len - (w - 2 * geom.trim())) / geom.step();
    WindowPlan { windowed: true, padded_len: w + k * geom.step() }
}

/// 由填充长度计算窗口数 `n`，要求 `len == W + (n - 1) * S` 精确成立。
pub fn window_count(len: usize, geom: &WindowGeometry) -> Result<usize, WindowError> {
    let (w, s) = (geom.window(), geom.step());
    if len < w || (len - w) % s != 0 {
        return Err(WindowError::UnreachableLength { len, window: w, step: s });
    }
    Ok((len - w) / s + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_batch_needs_no_windowing() {
        let g = WindowGeometry::default();
        assert_eq!(plan(0, &g), WindowPlan { windowed: false, padded_len: 440 });
        assert_eq!(plan(440, &g), WindowPlan { windowed: false, padded_len: 440 });
    }

    #[test]
    fn long_batch_is_padded_to_reachable_length() {
        let g = WindowGeometry::default();
        let p = plan(900, &g);
        assert!(p.windowed);
        assert_eq!(p.padded_len, 1100);
        assert_eq!(window_count(p.padded_len, &g).unwrap(), 3);

        let p = plan(441, &g);
        assert_eq!(p.padded_len, 770);
        assert_eq!(window_count(p.padded_len, &g).unwrap(), 2);
    }

    #[test]
    fn planned_length_covers_and_is_reachable() {
        let g = WindowGeometry::default();
        for max_len in (0..5000).step_by(7) {
            let p = plan(max_len, &g);
            assert!(p.padded_len >= max_len, "max_len={}", max_len);
            let n = window_count(p.padded_len, &g).unwrap();
            assert_eq!(p.padded_len, g.window() + (n - 1) * g.step());
            assert_eq!(p.windowed, n > 1);
        }
    }

    #[test]
    fn alternate_geometry() {
        let g = WindowGeometry::new(10, 6, 2).unwrap();
        let p = plan(25, &g);
        assert!(p.padded_len >= 25);
        assert!(window_count(p.padded_len, &g).is_ok());
    }

    #[test]
    fn window_count_rejects_unreachable_lengths() {
        let g = WindowGeometry::default();
        assert_eq!(window_count(440, &g).unwrap(), 1);
        assert!(window_count(439, &g).is_err());
        assert_eq!(
            window_count(1000, &g).unwrap_err(),
            WindowError::UnreachableLength { len: 1000, window: 440, step: 330 }
        );
    }
}
