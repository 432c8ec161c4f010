use crate::error::WindowError;

pub const WINDOW: usize = 440;
pub const STEP: usize = 330;
pub const TRIM: usize = 55;

/// 窗口几何：窗口长度 W、步长 S、拼接时每个共享边界裁掉的长度 T。
///
/// 构造时校验 `W - S == 2T`，只有这样相邻窗口裁剪后才能无缝、无重叠地拼回原坐标。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    window: usize,
    step: usize,
    trim: usize,
}

impl WindowGeometry {
    pub fn new(window: usize, step: usize, trim: usize) -> Result<Self, WindowError> {
        let valid = step > 0 && step <= window && window - step == 2 * trim;
        if !valid {
            return Err(WindowError::InvalidGeometry { window, step, trim });
        }
        Ok(Self { window, step, trim })
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn trim(&self) -> usize {
        self.trim
    }
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self { window: WINDOW, step: STEP, trim: TRIM }
    }
}
