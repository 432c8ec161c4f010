//! 演示如何在 library 模式下使用 raccess：拟合基线模型并预测一条长序列。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_predict
//! ```

use raccess::io::fasta::FastaRecord;
use raccess::model::{ProfileModel, PAD_TARGET};
use raccess::pipeline::{predict_records, PredictOpt};
use raccess::util::rna;
use raccess::window::{self, WindowGeometry};

fn main() -> anyhow::Result<()> {
    let geom = WindowGeometry::default();
    let w = geom.window();

    // 1. 训练数据：一条短序列及其（模型方向的）可及性
    let train_seq = b"GGGAAAUCCCUUUAGCAUGCAUGCUAGCUAGCAUCGAUCGAUGCUAGC";
    let codes = rna::encode(train_seq, w)?;
    let mut targets: Vec<f32> = codes
        .iter()
        .take(train_seq.len())
        .map(|&c| if c == rna::to_code(b'A') || c == rna::to_code(b'U') { 0.8 } else { 0.2 })
        .collect();
    targets.resize(w, PAD_TARGET);

    let model = ProfileModel::fit([(&codes[..], &targets[..])], w, 3)?;
    println!("模型：{}-mer，{} 个上下文", model.k, model.context.len());

    // 2. 一条超过窗口长度的序列
    let long: Vec<u8> = b"AUGCAUGGCU".iter().copied().cycle().take(900).collect();
    let plan = window::plan(long.len(), &geom);
    println!("序列长度 {}，填充到 {}，窗口数 {}", long.len(), plan.padded_len, window::window_count(plan.padded_len, &geom)?);

    // 3. 预测并还原到原始方向
    let records = vec![FastaRecord { id: "demo".into(), desc: None, seq: long }];
    let preds = predict_records(&model, &records, &PredictOpt::default())?;
    let oriented = preds[0].oriented();
    println!("输出长度 {}（填充后 {}）", oriented.len(), preds[0].scores.len());
    println!("前 10 个位点：{:?}", &oriented[..10]);

    Ok(())
}
