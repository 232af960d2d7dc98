use crate::config::{Config, CONFIG};

/// 检测引擎，各阶段能力以trait的形式分别实现
/// 见 DetectRegions、RectifyRegions、LocateRankPatch、ClassifyRank
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Engine { config }
    }
    /// 跨模块实现trait的时候访问不到成员变量，需要调用此函数
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for Engine {
    /// 使用全局配置
    fn default() -> Self {
        Engine::new(CONFIG.clone())
    }
}
