use rayon::prelude::*;

use super::geometry::WindowGeometry;
use super::plan::window_count;
use super::segment::Segmented;
use crate::error::WindowError;

/// 窗口 `ordinal`（共 n 个）在拼接时保留的局部区间 `[start, end)`
///
/// - 第一个窗口：`[0, W-T)`
/// - 中间窗口：`[T, W-T)`
/// - 最后一个窗口：`[T, W)`
#[inline]
pub fn kept_range(ordinal: usize, n: usize, geom: &WindowGeometry) -> (usize, usize) {
    let (w, t) = (geom.window(), geom.trim());
    if n == 1 {
        return (0, w);
    }
    let start = if ordinal == 0 { 0 } else { t };
    let end = if ordinal + 1 == n { w } else { w - t };
    (start, end)
}

/// 把一条序列按窗口顺序排列的模型输出拼回长度为 `padded_len` 的连续分数向量。
pub fn stitch(
    seq_id: usize,
    outputs: &[Vec<f32>],
    padded_len: usize,
    geom: &WindowGeometry,
) -> Result<Vec<f32>, WindowError> {
    let n = window_count(padded_len, geom)?;
    if outputs.len() != n {
        return Err(WindowError::OutputCount { seq_id, expected: n, actual: outputs.len() });
    }
    let w = geom.window();
    for (ordinal, out) in outputs.iter().enumerate() {
        if out.len() != w {
            return Err(WindowError::OutputLength { seq_id, ordinal, expected: w, actual: out.len() });
        }
    }

    if n == 1 {
        return Ok(outputs[0].clone());
    }

    let mut stitched = Vec::with_capacity(padded_len);
    for (ordinal, out) in outputs.iter().enumerate() {
        let (start, end) = kept_range(ordinal, n, geom);
        stitched.extend_from_slice(&out[start..end]);
    }
    if stitched.len() != padded_len {
        return Err(WindowError::LengthMismatch { expected: padded_len, actual: stitched.len() });
    }
    Ok(stitched)
}

/// 按 [`Segmented`] 的布局把展平的窗口输出拆回各条序列并分别拼接。
///
/// `outputs[i]` 必须对应 `segmented.windows[i]`；窗口标签顺序不对或数量不符都会失败，
/// 不做部分拼接。
pub fn stitch_all(
    segmented: &Segmented,
    outputs: &[Vec<f32>],
    geom: &WindowGeometry,
) -> Result<Vec<Vec<f32>>, WindowError> {
    let mut ranges = Vec::with_capacity(segmented.num_sequences());
    let mut offset = 0usize;
    for (seq_id, &n) in segmented.counts.iter().enumerate() {
        let available = outputs.len().saturating_sub(offset).min(n);
        if available < n {
            return Err(WindowError::OutputCount { seq_id, expected: n, actual: available });
        }
        let wins = segmented.windows.get(offset..offset + n).ok_or(WindowError::LengthMismatch {
            expected: offset + n,
            actual: segmented.windows.len(),
        })?;
        for (i, win) in wins.iter().enumerate() {
            if win.seq_id != seq_id || win.ordinal != i {
                return Err(WindowError::Misordered { seq_id, expected: i, actual: win.ordinal });
            }
        }
        ranges.push((seq_id, offset, n));
        offset += n;
    }
    if outputs.len() != offset {
        let (seq_id, _, n) = ranges.last().copied().unwrap_or((0, 0, 0));
        return Err(WindowError::OutputCount { seq_id, expected: n, actual: n + outputs.len() - offset });
    }

    ranges
        .into_par_iter()
        .map(|(seq_id, start, n)| stitch(seq_id, &outputs[start..start + n], segmented.padded_len, geom))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::segment::segment_batch;

    fn geom() -> WindowGeometry {
        WindowGeometry::default()
    }

    #[test]
    fn single_window_returned_unchanged() {
        let out: Vec<f32> = (0..440).map(|i| i as f32 * 0.5).collect();
        let stitched = stitch(0, &[out.clone()], 440, &geom()).unwrap();
        assert_eq!(stitched, out);
    }

    #[test]
    fn trim_boundaries_for_three_windows() {
        let g = geom();
        assert_eq!(kept_range(0, 3, &g), (0, 385));
        assert_eq!(kept_range(1, 3, &g), (55, 385));
        assert_eq!(kept_range(2, 3, &g), (55, 440));

        let ones = vec![1.0f32; 440];
        let stitched = stitch(0, &[ones.clone(), ones.clone(), ones], 1100, &g).unwrap();
        assert_eq!(stitched.len(), 1100);
        assert!(stitched.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn stitched_positions_map_back_to_global_coordinates() {
        // 每个窗口输出自身覆盖的全局坐标，拼接后应恰好得到 0..L，无空洞、无重复
        let g = geom();
        for n in 1..6 {
            let len = g.window() + (n - 1) * g.step();
            let outputs: Vec<Vec<f32>> = (0..n)
                .map(|i| (0..g.window()).map(|p| (i * g.step() + p) as f32).collect())
                .collect();
            let stitched = stitch(0, &outputs, len, &g).unwrap();
            let expected: Vec<f32> = (0..len).map(|p| p as f32).collect();
            assert_eq!(stitched, expected, "n={}", n);
        }
    }

    #[test]
    fn wrong_output_count_fails() {
        let ones = vec![1.0f32; 440];
        let err = stitch(4, &[ones.clone(), ones], 1100, &geom()).unwrap_err();
        assert_eq!(err, WindowError::OutputCount { seq_id: 4, expected: 3, actual: 2 });
    }

    #[test]
    fn wrong_output_length_fails() {
        let err = stitch(0, &[vec![1.0f32; 440], vec![1.0f32; 439]], 770, &geom()).unwrap_err();
        assert_eq!(err, WindowError::OutputLength { seq_id: 0, ordinal: 1, expected: 440, actual: 439 });
    }

    #[test]
    fn stitch_all_splits_by_sequence() {
        let g = geom();
        let encoded = vec![vec![2u8; 770], vec![3u8; 770]];
        let seg = segment_batch(&encoded, 770, &g).unwrap();
        let outputs: Vec<Vec<f32>> = seg.windows.iter().map(|w| vec![w.seq_id as f32; 440]).collect();
        let rows = stitch_all(&seg, &outputs, &g).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].iter().all(|&v| v == 0.0));
        assert!(rows[1].iter().all(|&v| v == 1.0));
        assert_eq!(rows[1].len(), 770);
    }

    #[test]
    fn stitch_all_rejects_missing_and_extra_outputs() {
        let g = geom();
        let seg = segment_batch(&[vec![2u8; 770], vec![3u8; 770]], 770, &g).unwrap();
        let short = vec![vec![0.0f32; 440]; 3];
        assert_eq!(
            stitch_all(&seg, &short, &g).unwrap_err(),
            WindowError::OutputCount { seq_id: 1, expected: 2, actual: 1 }
        );
        let long = vec![vec![0.0f32; 440]; 5];
        assert!(matches!(stitch_all(&seg, &long, &g), Err(WindowError::OutputCount { .. })));
    }

    #[test]
    fn stitch_all_rejects_misordered_windows() {
        let g = geom();
        let mut seg = segment_batch(&[vec![2u8; 770]], 770, &g).unwrap();
        seg.windows.swap(0, 1);
        let outputs = vec![vec![0.0f32; 440]; 2];
        assert_eq!(
            stitch_all(&seg, &outputs, &g).unwrap_err(),
            WindowError::Misordered { seq_id: 0, expected: 0, actual: 1 }
        );
    }
}
