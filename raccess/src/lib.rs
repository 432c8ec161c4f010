//! # raccess
//!
//! RNA 逐位点可及性（accessibility）预测：把原始序列编码后交给定长输入的模型打分，
//! 并从 (序列, 可及性) 样本训练模型。
//!
//! 模型只接受长度为 W 的窗口，因此较长的序列会被切成重叠窗口，各自打分后
//! 裁掉边界上下文不足的部分再拼回原坐标：
//!
//! - **编码**：反转序列，映射到 {0:pad, 1:mask, 2:A, 3:U/T, 4:G, 5:C}，补齐到统一长度
//! - **规划**：按批内最长序列决定是否窗口化及填充长度
//! - **切窗**：窗口 i 覆盖 `[i*S, i*S + W)`
//! - **分批推理**：按固定批大小依次调用模型，保持顺序
//! - **拼接**：首窗口保留 `[0, W-T)`，中间 `[T, W-T)`，末窗口 `[T, W)`
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use raccess::io::fasta::FastaRecord;
//! use raccess::model::ProfileModel;
//! use raccess::pipeline::{predict_records, PredictOpt};
//!
//! let model = ProfileModel::load_from_file("profile.model").unwrap();
//! let records = vec![FastaRecord { id: "tx1".into(), desc: None, seq: b"AUGGCUACGU".to_vec() }];
//! let preds = predict_records(&model, &records, &PredictOpt::default()).unwrap();
//! for p in &preds {
//!     println!("{}: {:?}", p.id, p.oriented());
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`util`] — 核苷酸字母表与序列编码
//! - [`window`] — 窗口几何、规划、切窗与拼接
//! - [`model`] — 模型能力接口与基线 profile 模型
//! - [`batch`] — 保序的分批推理
//! - [`pipeline`] — 端到端预测
//! - [`train`] — 训练样本准备、拟合与评估
//! - [`io`] — FASTA 读取、可及性表读写

pub mod batch;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod train;
pub mod util;
pub mod window;

pub use error::WindowError;
