use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::ScoreModel;
use crate::util::rna::{PAD, SIGMA};

/// 训练目标中标记填充位点的哨兵值
pub const PAD_TARGET: f32 = -1.0;

pub const MAX_K: usize = 11;

#[inline]
pub fn is_pad_target(t: f32) -> bool {
    t == PAD_TARGET
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMeta {
    pub training_files: Vec<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// 基线可及性模型：以位点为中心的 k-mer 上下文平均可及性表。
///
/// - 查表失败时退回该核苷酸的平均值，再退回全局平均值；
/// - 填充位点（code 0）恒输出 0；
/// - 窗口边界外的上下文视为填充。
///
/// 拟合是闭式平均，不涉及优化器。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileModel {
    pub window: usize,
    pub k: usize,
    pub context: HashMap<u32, f32>,
    /// base[code] = 该 code 的平均可及性（无数据时为全局平均）
    pub base: Vec<f32>,
    pub global: f32,
    pub meta: ModelMeta,
}

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    #[inline]
    fn add(&mut self, v: f32) {
        self.sum += v as f64;
        self.count += 1;
    }

    fn value(&self) -> Option<f32> {
        (self.count > 0).then(|| (self.sum / self.count as f64) as f32)
    }
}

/// 字母表之外的编码会让上下文键越界，拟合与打分前统一拒绝
fn check_alphabet(codes: &[u8]) -> Result<()> {
    if let Some(pos) = codes.iter().position(|&c| c as usize >= SIGMA) {
        bail!("code {} at position {} is outside the alphabet (0..{})", codes[pos], pos, SIGMA);
    }
    Ok(())
}

/// 位点 `pos` 处长度为 k 的居中上下文，按 SIGMA 进制编码
#[inline]
fn context_key(codes: &[u8], pos: usize, k: usize) -> u32 {
    let half = k / 2;
    let mut key = 0u32;
    for j in 0..k {
        let c = (pos + j)
            .checked_sub(half)
            .and_then(|p| codes.get(p))
            .copied()
            .unwrap_or(PAD);
        key = key * SIGMA as u32 + c as u32;
    }
    key
}

impl ProfileModel {
    /// 从 (编码窗口, 逐位点目标) 对拟合模型。目标为 [`PAD_TARGET`] 或编码为填充的位点被忽略。
    pub fn fit<'a, I>(examples: I, window: usize, k: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a [u8], &'a [f32])>,
    {
        if k == 0 || k % 2 == 0 || k > MAX_K {
            bail!("k-mer size must be odd and in 1..={}, got {}", MAX_K, k);
        }

        let mut context: HashMap<u32, Mean> = HashMap::new();
        let mut base = [Mean::default(); SIGMA];
        let mut global = Mean::default();

        for (codes, targets) in examples {
            if codes.len() != window || targets.len() != window {
                bail!(
                    "training window length mismatch: codes={}, targets={}, expected {}",
                    codes.len(),
                    targets.len(),
                    window
                );
            }
            check_alphabet(codes)?;
            for (pos, (&c, &t)) in codes.iter().zip(targets).enumerate() {
                if c == PAD || is_pad_target(t) {
                    continue;
                }
                context.entry(context_key(codes, pos, k)).or_default().add(t);
                base[c as usize].add(t);
                global.add(t);
            }
        }

        let Some(global) = global.value() else {
            bail!("no labelled positions in training data");
        };
        let base = base.iter().map(|m| m.value().unwrap_or(global)).collect();
        let context = context
            .into_iter()
            .filter_map(|(key, m)| m.value().map(|v| (key, v)))
            .collect();

        Ok(Self { window, k, context, base, global, meta: ModelMeta::default() })
    }

    pub fn set_meta(&mut self, meta: ModelMeta) {
        self.meta = meta;
    }

    fn score_window(&self, codes: &[u8]) -> Vec<f32> {
        codes
            .iter()
            .enumerate()
            .map(|(pos, &c)| {
                if c == PAD {
                    return 0.0;
                }
                match self.context.get(&context_key(codes, pos, self.k)) {
                    Some(&v) => v,
                    None => self.base.get(c as usize).copied().unwrap_or(self.global),
                }
            })
            .collect()
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let mut f = std::io::BufWriter::new(std::fs::File::create(path)?);
        bincode::serialize_into(&mut f, self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let f = std::io::BufReader::new(std::fs::File::open(path)?);
        let model: Self = bincode::deserialize_from(f)?;
        if model.k == 0 || model.k > MAX_K || model.base.len() != SIGMA {
            bail!("corrupt model file '{}'", path);
        }
        Ok(model)
    }
}

impl ScoreModel for ProfileModel {
    fn window_len(&self) -> usize {
        self.window
    }

    fn evaluate(&self, batch: &[&[u8]]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(batch.len());
        for (i, codes) in batch.iter().enumerate() {
            if codes.len() != self.window {
                bail!("window {} has length {}, model expects {}", i, codes.len(), self.window);
            }
            check_alphabet(codes).with_context(|| format!("window {}", i))?;
            out.push(self.score_window(codes));
        }
        Ok(out)
    }
}
