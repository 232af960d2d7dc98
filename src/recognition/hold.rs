use crate::config::HoldArgs;

/// 隔帧检测时保留上一次的结果，由调用方在帧循环中持有
#[derive(Debug, Clone)]
pub struct HeldDetections<T> {
    frame_stride: u64,
    held: Vec<T>,
}

impl<T> HeldDetections<T> {
    /// stride 为0时按1处理，即每帧都检测
    pub fn new(frame_stride: u64) -> Self {
        Self {
            frame_stride: frame_stride.max(1),
            held: Vec::new(),
        }
    }

    pub fn from_args(args: &HoldArgs) -> Self {
        Self::new(args.frame_stride)
    }

    /// frame_index 是 stride 的整数倍时重新检测并替换保留的结果，否则直接返回保留的结果
    pub fn observe<F>(&mut self, frame_index: u64, detect: F) -> &[T]
    where
        F: FnOnce() -> Vec<T>,
    {
        if frame_index % self.frame_stride == 0 {
            self.held = detect();
        }
        &self.held
    }

    pub fn held(&self) -> &[T] {
        &self.held
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl<T> Default for HeldDetections<T> {
    fn default() -> Self {
        Self::from_args(&HoldArgs::default())
    }
}
