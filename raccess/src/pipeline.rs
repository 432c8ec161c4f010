use anyhow::{bail, Result};
use log::{debug, info};
use rayon::prelude::*;

use crate::batch::Batcher;
use crate::error::WindowError;
use crate::io::fasta::FastaRecord;
use crate::model::ScoreModel;
use crate::util::rna;
use crate::window::{self, WindowGeometry};

pub const DEFAULT_BATCH_SIZE: usize = 256;

#[derive(Clone, Copy, Debug)]
pub struct PredictOpt {
    pub batch_size: usize,
    pub geometry: WindowGeometry,
}

impl Default for PredictOpt {
    fn default() -> Self {
        Self { batch_size: DEFAULT_BATCH_SIZE, geometry: WindowGeometry::default() }
    }
}

/// 一条输入序列的预测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub id: String,
    /// 真实序列长度
    pub len: usize,
    /// 拼接后的分数，模型方向（反向），长度为批内统一的填充长度
    pub scores: Vec<f32>,
}

impl Prediction {
    /// 去掉尾部填充并翻回原始方向的分数，与输入序列逐位对齐
    pub fn oriented(&self) -> Vec<f32> {
        self.scores.iter().take(self.len).rev().copied().collect()
    }
}

/// 对一批原始序列做完整推理：编码 -> 规划 -> 切窗 -> 分批打分 -> 拼接。
///
/// 返回值与输入一一对应，每行长度为批内统一的填充长度（模型方向）。
pub fn predict_sequences<M, S>(model: &M, seqs: &[S], opt: &PredictOpt) -> Result<Vec<Vec<f32>>>
where
    M: ScoreModel + ?Sized,
    S: AsRef<[u8]> + Sync,
{
    let geom = &opt.geometry;
    if model.window_len() != geom.window() {
        bail!(
            "model window length {} does not match geometry window {}",
            model.window_len(),
            geom.window()
        );
    }
    let batcher = Batcher::new(opt.batch_size)?;
    if seqs.is_empty() {
        return Ok(Vec::new());
    }

    let max_len = seqs.iter().map(|s| s.as_ref().len()).max().unwrap_or(0);
    let plan = window::plan(max_len, geom);
    info!(
        "{} sequences, max length {}, padded to {} (windowed: {})",
        seqs.len(),
        max_len,
        plan.padded_len,
        plan.windowed
    );

    let encoded: Vec<Vec<u8>> = seqs
        .par_iter()
        .map(|s| rna::encode(s.as_ref(), plan.padded_len))
        .collect::<Result<_, WindowError>>()?;

    let segmented = window::segment_batch(&encoded, plan.padded_len, geom)?;
    debug!(
        "{} windows, batch size {}",
        segmented.windows.len(),
        batcher.batch_size()
    );

    let outputs = batcher.run(model, &segmented.windows)?;
    let rows = window::stitch_all(&segmented, &outputs, geom)?;
    Ok(rows)
}

pub fn predict_records<M: ScoreModel + ?Sized>(
    model: &M,
    records: &[FastaRecord],
    opt: &PredictOpt,
) -> Result<Vec<Prediction>> {
    let seqs: Vec<&[u8]> = records.iter().map(|r| r.seq.as_slice()).collect();
    let rows = predict_sequences(model, &seqs, opt)?;
    Ok(records
        .iter()
        .zip(rows)
        .map(|(r, scores)| Prediction { id: r.id.clone(), len: r.seq.len(), scores })
        .collect())
}
