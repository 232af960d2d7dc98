use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "CARD_DETECT_CONFIG";
/// 默认配置文件路径
pub const CONFIG_PATH: &str = "config.yaml";

/// 轮廓过滤参数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContourFilterArgs {
    pub min_area: f64,
    pub min_perimeter: f64,
}

impl Default for ContourFilterArgs {
    fn default() -> Self {
        Self {
            min_area: 3000.0,
            min_perimeter: 250.0,
        }
    }
}

/// 四边形构建参数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuadBuilderArgs {
    /// 补偿上游形态学腐蚀的像素外扩
    pub pixel_tolerance: i32,
    /// 峰值检测半窗口
    pub peak_window: usize,
    pub min_prominence: f64,
}

impl Default for QuadBuilderArgs {
    fn default() -> Self {
        Self {
            pixel_tolerance: 7,
            peak_window: 25,
            min_prominence: 10.0,
        }
    }
}

/// 透视矫正参数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RectifyArgs {
    pub card_width: u32,
    pub card_height: u32,
}

impl Default for RectifyArgs {
    fn default() -> Self {
        Self {
            card_width: 400,
            card_height: 600,
        }
    }
}

/// 默认卡片增强参数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnhanceArgs {
    pub clahe_clip_limit: f32,
    pub clahe_tiles: u32,
    pub blur_sigma: f32,
}

impl Default for EnhanceArgs {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            blur_sigma: 1.7,
        }
    }
}

/// 点数区域提取参数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RankPatchArgs {
    pub base_width: u32,
    pub base_height: u32,
    pub scale: f32,
    pub clahe_clip_limit: f32,
    pub clahe_tiles: u32,
    /// 反向二值化阈值，暗色墨迹变为前景
    pub ink_threshold: u8,
    /// 合成后清理抗锯齿的阈值
    pub clean_threshold: u8,
    pub center_width_ratio: f32,
    pub center_height_ratio: f32,
    pub max_components: usize,
    /// 左侧补白列数，0表示不补
    pub left_margin: u32,
    pub max_ink_ratio: f64,
    pub min_ink_pixels: u32,
}

impl Default for RankPatchArgs {
    fn default() -> Self {
        Self {
            base_width: 70,
            base_height: 103,
            scale: 1.2,
            clahe_clip_limit: 8.0,
            clahe_tiles: 8,
            ink_threshold: 180,
            clean_threshold: 234,
            center_width_ratio: 0.7,
            center_height_ratio: 0.5,
            max_components: 2,
            left_margin: 20,
            max_ink_ratio: 0.4,
            min_ink_pixels: 500,
        }
    }
}

impl RankPatchArgs {
    /// 窗口宽高 = round(base × scale)
    pub fn window_size(&self) -> (u32, u32) {
        (
            (self.base_width as f32 * self.scale).round() as u32,
            (self.base_height as f32 * self.scale).round() as u32,
        )
    }
}

/// 分类器输入参数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierArgs {
    pub input_size: u32,
}

impl Default for ClassifierArgs {
    fn default() -> Self {
        Self { input_size: 128 }
    }
}

/// 隔帧保持参数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HoldArgs {
    pub frame_stride: u64,
}

impl Default for HoldArgs {
    fn default() -> Self {
        Self { frame_stride: 2 }
    }
}

/// 配置参数
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub contour_filter: ContourFilterArgs,
    pub quad_builder: QuadBuilderArgs,
    pub rectify: RectifyArgs,
    pub enhance: EnhanceArgs,
    pub rank_patch: RankPatchArgs,
    pub classifier: ClassifierArgs,
    pub hold: HoldArgs,
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config = serde_yaml::from_str(yaml).context("Failed to parse config")?;
        Ok(config)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// 文件不存在时使用默认值，解析失败时告警并使用默认值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("配置文件 {} 不存在，使用默认配置", path.display());
            return Self::default();
        }
        match Self::from_yaml_file(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("配置文件读取失败，使用默认配置: {err:#}");
                Self::default()
            }
        }
    }
}

// 全局配置单例
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
    Config::load_or_default(path)
});
