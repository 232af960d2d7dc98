use image::imageops::{resize, FilterType};
use image::GrayImage;
use log::warn;

use crate::config::ClassifierArgs;
use crate::recognition::engine::Engine;

/// 分类器输出下标对应的点数
pub const RANK_LABELS: [&str; 13] = ["10", "2", "3", "4", "5", "6", "7", "8", "9", "A", "J", "K", "Q"];
pub const UNKNOWN_LABEL: &str = "Unknown";
pub const INVALID_LABEL: &str = "Invalid";

/// 外部点数分类模型。输入为 size x size 的单通道像素，行优先，取值约在[-1, 1]
pub trait RankClassifier {
    fn predict(&self, input: &[f32]) -> Option<usize>;
}

pub trait ClassifyRank {
    fn classify_rank(&self, classifier: &dyn RankClassifier, patch: &GrayImage) -> &'static str;
}

impl ClassifyRank for Engine {
    fn classify_rank(&self, classifier: &dyn RankClassifier, patch: &GrayImage) -> &'static str {
        recognize_rank(classifier, patch, &self.config().classifier)
    }
}

/// 缩放到 input_size 见方，像素映射到 (v / 255 - 0.5) / 0.5
pub fn classifier_input(patch: &GrayImage, input_size: u32) -> Vec<f32> {
    let resized = resize(patch, input_size, input_size, FilterType::Triangle);
    resized.pixels().map(|p| (p[0] as f32 / 255.0 - 0.5) / 0.5).collect()
}

pub fn recognize_rank(classifier: &dyn RankClassifier, patch: &GrayImage, args: &ClassifierArgs) -> &'static str {
    if patch.width() == 0 || patch.height() == 0 {
        return INVALID_LABEL;
    }
    let input = classifier_input(patch, args.input_size);
    match classifier.predict(&input) {
        Some(index) => RANK_LABELS.get(index).copied().unwrap_or_else(|| {
            warn!("分类结果下标 {index} 越界");
            UNKNOWN_LABEL
        }),
        None => UNKNOWN_LABEL,
    }
}

/// 模型输出的最大值下标，给分类器实现用。相同时取靠前的，NaN 忽略
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}
