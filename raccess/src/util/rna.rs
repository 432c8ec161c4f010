use crate::error::WindowError;

pub const SIGMA: usize = 6; // {0:pad, 1:mask, 2:A, 3:U/T, 4:G, 5:C}

pub const PAD: u8 = 0;
pub const MASK: u8 = 1;

#[inline]
pub fn to_code(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'A' => 2,
        b'U' | b'T' => 3,
        b'G' => 4,
        b'C' => 5,
        _ => MASK, // N, IUPAC 以及其它任意字符
    }
}

/// 序列编码器：先反转序列（流水线固定的方向约定），逐字符映射到字母表，
/// 再右侧补 0 到 `target_len`。
///
/// 未知字符映射为 [`MASK`]，不会报错；`target_len` 小于序列长度则返回
/// [`WindowError::TargetTooShort`]。
pub fn encode(seq: &[u8], target_len: usize) -> Result<Vec<u8>, WindowError> {
    if target_len < seq.len() {
        return Err(WindowError::TargetTooShort { len: seq.len(), target: target_len });
    }
    let mut out = Vec::with_capacity(target_len);
    for &b in seq.iter().rev() {
        out.push(to_code(b));
    }
    out.resize(target_len, PAD);
    Ok(out)
}
