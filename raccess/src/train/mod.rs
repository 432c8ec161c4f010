//! 训练：准备 (序列, 可及性) 样本、划分训练/验证集、拟合基线模型并评估。
//!
//! 训练样本不做窗口化：序列必须不长于窗口长度，编码到 W，
//! 目标右侧用 [`PAD_TARGET`] 补齐到 W，填充位点不参与拟合与评估。

use anyhow::{bail, Result};
use log::{info, warn};
use rayon::prelude::*;

use crate::batch::Batcher;
use crate::io::fasta::FastaRecord;
use crate::model::{ProfileModel, ScoreModel, PAD_TARGET};
use crate::pipeline::DEFAULT_BATCH_SIZE;
use crate::util::rna;
use crate::window::{Window, WindowGeometry};

pub mod metrics;

pub use metrics::Metrics;

pub const DEFAULT_KMER: usize = 7;
pub const DEFAULT_VAL_EVERY: usize = 10;

#[derive(Clone, Copy, Debug)]
pub struct TrainOpt {
    pub kmer: usize,
    /// 每 `val_every` 个样本取一个做验证；0 表示不划分验证集
    pub val_every: usize,
    pub batch_size: usize,
    pub geometry: WindowGeometry,
}

impl Default for TrainOpt {
    fn default() -> Self {
        Self {
            kmer: DEFAULT_KMER,
            val_every: DEFAULT_VAL_EVERY,
            batch_size: DEFAULT_BATCH_SIZE,
            geometry: WindowGeometry::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub id: String,
    /// 反向编码并填充到 W
    pub codes: Vec<u8>,
    /// 与 codes 同方向，填充位为 PAD_TARGET
    pub targets: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub n_train: usize,
    pub n_val: usize,
    pub validation: Option<Metrics>,
}

/// 把序列记录与可及性行按顺序配对成训练样本。
///
/// 可及性行已经是模型方向，不做反转，只补齐哨兵。
pub fn prepare_examples(
    records: &[FastaRecord],
    targets: &[Vec<f32>],
    geom: &WindowGeometry,
) -> Result<Vec<TrainingExample>> {
    if records.len() != targets.len() {
        bail!(
            "{} sequences but {} accessibility rows",
            records.len(),
            targets.len()
        );
    }
    let w = geom.window();
    records
        .par_iter()
        .zip(targets)
        .map(|(rec, acc)| {
            if rec.seq.len() > w {
                bail!("sequence '{}' has length {} > window {}", rec.id, rec.seq.len(), w);
            }
            if acc.len() != rec.seq.len() {
                bail!(
                    "sequence '{}': {} accessibility values for {} nucleotides",
                    rec.id,
                    acc.len(),
                    rec.seq.len()
                );
            }
            let codes = rna::encode(&rec.seq, w)?;
            let mut padded = acc.clone();
            padded.resize(w, PAD_TARGET);
            Ok(TrainingExample { id: rec.id.clone(), codes, targets: padded })
        })
        .collect()
}

/// 确定性划分：下标满足 `i % val_every == val_every - 1` 的样本进入验证集
pub fn split_train_val(
    examples: Vec<TrainingExample>,
    val_every: usize,
) -> (Vec<TrainingExample>, Vec<TrainingExample>) {
    if val_every == 0 {
        return (examples, Vec::new());
    }
    let (val, train): (Vec<_>, Vec<_>) = examples
        .into_iter()
        .enumerate()
        .partition(|(i, _)| i % val_every == val_every - 1);
    (
        train.into_iter().map(|(_, e)| e).collect(),
        val.into_iter().map(|(_, e)| e).collect(),
    )
}

/// 用分批推理对样本打分并与目标比较
pub fn evaluate<M: ScoreModel + ?Sized>(
    model: &M,
    examples: &[TrainingExample],
    batch_size: usize,
) -> Result<Metrics> {
    let windows: Vec<Window> = examples
        .iter()
        .enumerate()
        .map(|(i, e)| Window { seq_id: i, ordinal: 0, codes: e.codes.clone() })
        .collect();
    let outputs = Batcher::new(batch_size)?.run(model, &windows)?;

    let targets: Vec<f32> = examples.iter().flat_map(|e| e.targets.iter().copied()).collect();
    let predicted: Vec<f32> = outputs.into_iter().flatten().collect();
    if targets.len() != predicted.len() {
        bail!("model returned {} scores for {} target positions", predicted.len(), targets.len());
    }
    Ok(metrics::evaluate_pairs(&targets, &predicted))
}

pub fn train(examples: Vec<TrainingExample>, opt: &TrainOpt) -> Result<(ProfileModel, TrainReport)> {
    if examples.is_empty() {
        bail!("no training examples");
    }
    let (train_set, val_set) = split_train_val(examples, opt.val_every);
    if train_set.is_empty() {
        bail!("training split is empty (val_every={})", opt.val_every);
    }
    info!("train: {} examples, validation: {} examples", train_set.len(), val_set.len());

    let model = ProfileModel::fit(
        train_set.iter().map(|e| (e.codes.as_slice(), e.targets.as_slice())),
        opt.geometry.window(),
        opt.kmer,
    )?;
    info!("fitted {}-mer profile with {} contexts", model.k, model.context.len());

    let validation = if val_set.is_empty() {
        warn!("validation split is empty, skipping evaluation");
        None
    } else {
        let m = evaluate(&model, &val_set, opt.batch_size)?;
        info!(
            "validation: positions={}, normMSE={}, spearman={}",
            m.positions,
            fmt_opt(m.norm_mse),
            fmt_opt(m.spearman)
        );
        Some(m)
    };

    let report = TrainReport { n_train: train_set.len(), n_val: val_set.len(), validation };
    Ok((model, report))
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{:.4}", x))
}
