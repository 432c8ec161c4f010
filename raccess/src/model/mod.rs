//! 模型协作者。
//!
//! 窗口化流水线只依赖 [`ScoreModel`] 这一能力：输入一批定长编码窗口，
//! 按相同顺序返回逐位点分数。具体网络结构（FCN / Unet / BERT 等）可以作为
//! 不同实现互换；本 crate 自带一个可训练的基线实现 [`ProfileModel`]。

use anyhow::Result;

pub mod profile;

pub use profile::{is_pad_target, ModelMeta, ProfileModel, PAD_TARGET};

pub trait ScoreModel {
    /// 模型接受的定长窗口长度
    fn window_len(&self) -> usize;

    /// 对一批窗口打分。返回值与输入一一对应、顺序相同，每个分数向量长度等于窗口长度。
    /// 相同权重与输入下必须是确定性的。
    fn evaluate(&self, batch: &[&[u8]]) -> Result<Vec<Vec<f32>>>;
}
