use crate::model::is_pad_target;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// 参与评估的非填充位点数
    pub positions: usize,
    pub norm_mse: Option<f64>,
    pub spearman: Option<f64>,
}

/// 去掉目标为填充哨兵的位点，返回成对的 (目标, 预测)
pub fn remove_padding(targets: &[f32], outputs: &[f32]) -> (Vec<f32>, Vec<f32>) {
    targets
        .iter()
        .zip(outputs)
        .filter(|&(&t, _)| !is_pad_target(t))
        .map(|(&t, &o)| (t, o))
        .unzip()
}

/// `mean((t - o)^2) / mean(t)`；空输入或目标均值为 0 时返回 None
pub fn norm_mse(targets: &[f32], outputs: &[f32]) -> Option<f64> {
    let n = targets.len().min(outputs.len());
    if n == 0 {
        return None;
    }
    let mut sq = 0.0f64;
    let mut sum_t = 0.0f64;
    for (&t, &o) in targets.iter().zip(outputs) {
        let d = t as f64 - o as f64;
        sq += d * d;
        sum_t += t as f64;
    }
    let mean_t = sum_t / n as f64;
    if mean_t == 0.0 {
        return None;
    }
    Some(sq / n as f64 / mean_t)
}

/// 平均秩（并列取平均）
fn ranks(xs: &[f32]) -> Vec<f64> {
    let mut idx: Vec<usize> = (0..xs.len()).collect();
    idx.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));
    let mut out = vec![0.0; xs.len()];
    let mut i = 0;
    while i < idx.len() {
        let mut j = i + 1;
        while j < idx.len() && xs[idx[j]] == xs[idx[i]] {
            j += 1;
        }
        // 位置 i..j 并列，秩为 (i+1 + j) / 2
        let r = (i + 1 + j) as f64 / 2.0;
        for &k in &idx[i..j] {
            out[k] = r;
        }
        i = j;
    }
    out
}

/// Spearman 秩相关系数；少于两个点或任一侧方差为 0 时返回 None
pub fn spearman(a: &[f32], b: &[f32]) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < 2 {
        return None;
    }
    let ra = ranks(&a[..n]);
    let rb = ranks(&b[..n]);
    let mean = (n as f64 + 1.0) / 2.0;
    let (mut cov, mut va, mut vb) = (0.0, 0.0, 0.0);
    for (x, y) in ra.iter().zip(&rb) {
        cov += (x - mean) * (y - mean);
        va += (x - mean) * (x - mean);
        vb += (y - mean) * (y - mean);
    }
    if va == 0.0 || vb == 0.0 {
        return None;
    }
    Some(cov / (va * vb).sqrt())
}

pub fn evaluate_pairs(targets: &[f32], outputs: &[f32]) -> Metrics {
    let (t, o) = remove_padding(targets, outputs);
    Metrics { positions: t.len(), norm_mse: norm_mse(&t, &o), spearman: spearman(&t, &o) }
}
