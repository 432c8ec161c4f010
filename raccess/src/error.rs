use thiserror::Error;

/// 窗口化流水线中的前置条件错误。
///
/// 这些错误都表示调用方违反了几何或长度约定，属于 fail-fast 的编程错误，
/// 不会被静默截断或补齐。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// 窗口几何不满足 `window - step == 2 * trim`
    #[error("invalid window geometry: window={window}, step={step}, trim={trim} (need window - step == 2 * trim)")]
    InvalidGeometry { window: usize, step: usize, trim: usize },
    /// 目标长度小于序列长度
    #[error("target length {target} is shorter than sequence length {len}")]
    TargetTooShort { len: usize, target: usize },
    /// 填充长度无法被整数个步长恰好覆盖
    #[error("padded length {len} is not reachable with window={window}, step={step}")]
    UnreachableLength { len: usize, window: usize, step: usize },
    /// 编码后长度与计划长度不一致
    #[error("encoded length {actual} does not match planned length {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    /// 某条序列的窗口输出数量与期望不符
    #[error("sequence {seq_id}: expected {expected} window outputs, got {actual}")]
    OutputCount { seq_id: usize, expected: usize, actual: usize },
    /// 单个窗口输出长度不等于窗口长度
    #[error("sequence {seq_id} window {ordinal}: output length {actual}, expected {expected}")]
    OutputLength { seq_id: usize, ordinal: usize, expected: usize, actual: usize },
    /// 窗口输出顺序错乱
    #[error("window outputs out of order: expected sequence {seq_id} window {expected}, got window {actual}")]
    Misordered { seq_id: usize, expected: usize, actual: usize },
}
