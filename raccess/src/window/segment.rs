use rayon::prelude::*;

use super::geometry::WindowGeometry;
use super::plan::window_count;
use crate::error::WindowError;

/// 编码序列上长度为 W 的连续切片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// 所属序列在批内的序号
    pub seq_id: usize,
    /// 在该序列窗口中的位置（从 0 开始）
    pub ordinal: usize,
    pub codes: Vec<u8>,
}

/// 一批序列展平后的窗口列表，先按序列、再按窗口位置排列
#[derive(Debug, Clone)]
pub struct Segmented {
    pub windows: Vec<Window>,
    /// counts[seq_id] = 该序列的窗口数 n
    pub counts: Vec<usize>,
    pub padded_len: usize,
}

impl Segmented {
    pub fn num_sequences(&self) -> usize {
        self.counts.len()
    }
}

/// 把一条编码序列切成重叠窗口：窗口 i 覆盖 `[i*S, i*S + W)`。
///
/// 长度必须恰好可达（`len == W + (n-1)*S`），否则返回错误而不是补空窗口。
pub fn segment(seq_id: usize, encoded: &[u8], geom: &WindowGeometry) -> Result<Vec<Window>, WindowError> {
    let n = window_count(encoded.len(), geom)?;
    if n == 1 {
        return Ok(vec![Window { seq_id, ordinal: 0, codes: encoded.to_vec() }]);
    }
    let (w, s) = (geom.window(), geom.step());
    let windows = (0..n)
        .map(|i| Window {
            seq_id,
            ordinal: i,
            codes: encoded[i * s..i * s + w].to_vec(),
        })
        .collect();
    Ok(windows)
}

/// 并行切分一批等长编码序列，并展平成单个窗口列表。
pub fn segment_batch(
    encoded: &[Vec<u8>],
    padded_len: usize,
    geom: &WindowGeometry,
) -> Result<Segmented, WindowError> {
    if let Some(bad) = encoded.iter().find(|e| e.len() != padded_len) {
        return Err(WindowError::LengthMismatch { expected: padded_len, actual: bad.len() });
    }

    let per_seq: Vec<Vec<Window>> = encoded
        .par_iter()
        .enumerate()
        .map(|(id, e)| segment(id, e, geom))
        .collect::<Result<_, _>>()?;

    let counts = per_seq.iter().map(Vec::len).collect();
    let windows = per_seq.into_iter().flatten().collect();
    Ok(Segmented { windows, counts, padded_len })
}
