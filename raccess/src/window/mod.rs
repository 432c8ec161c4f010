//! 长序列窗口化与拼接。
//!
//! 模型只接受定长输入：超过窗口长度的序列被切成重叠窗口分别打分，
//! 再裁掉每个共享边界上的 T 个位置拼回原坐标。

pub mod geometry;
pub mod plan;
pub mod segment;
pub mod stitch;

pub use geometry::WindowGeometry;
pub use plan::{plan, window_count, WindowPlan};
pub use segment::{segment, segment_batch, Segmented, Window};
pub use stitch::{kept_range, stitch, stitch_all};
