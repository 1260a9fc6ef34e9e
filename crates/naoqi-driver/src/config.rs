//! 驱动配置
//!
//! 配置来源（参数服务器、文件、命令行）不属于核心；核心只消费
//! 一个已就位的 [`DriverConfig`]。提供 TOML 加载便于二进制入口使用。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{DriverError, Result};

/// 驱动配置
///
/// 字段覆盖 NAOqi DCM 驱动节点惯用的参数面。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// 本体类型（如 "H25"、"H21"），影响 mimic 关节过滤规则。
    /// 留空则在连接时从 Memory 后端读取。
    pub body_type: String,

    /// 受控关节组。留空时回退到双臂（`["LArm", "RArm"]`）。
    pub motor_groups: Vec<String>,

    /// 控制循环频率（Hz），必须为正
    pub controller_frequency: f64,

    /// 高频通信频率（Hz），预留给高频发布方
    pub high_communication_frequency: f64,

    /// 关节命令变化检测阈值（弧度）。所有关节的
    /// `|command - measured|` 都不超过该值时本周期不写后端。
    pub joint_precision: f64,

    /// 发布通道容量（满则丢弃，不阻塞控制循环）
    pub topic_queue: usize,

    /// 发布名前缀，规范化后以 `/` 结尾
    pub prefix: String,

    /// 启用低层 DCM 直写通道（与高层通道刚度互斥，慎用）
    pub use_dcm: bool,

    /// 启用外部速度命令入口
    pub use_cmd_vel: bool,

    /// 速度命令后、重新拉臂刚度前的静置时间（秒）
    pub cmd_vel_settle_s: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            body_type: String::new(),
            motor_groups: vec!["LArm".to_string(), "RArm".to_string()],
            controller_frequency: 15.0,
            high_communication_frequency: 50.0,
            joint_precision: 0.1,
            topic_queue: 10,
            prefix: "naoqi_dcm".to_string(),
            use_dcm: false,
            use_cmd_vel: false,
            cmd_vel_settle_s: 1.0,
        }
    }
}

impl DriverConfig {
    /// 从 TOML 文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| DriverError::Config(format!("cannot read config file: {e}")))?;
        let config: DriverConfig = toml::from_str(&content)
            .map_err(|e| DriverError::Config(format!("cannot parse config file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<()> {
        if !self.controller_frequency.is_finite() || self.controller_frequency <= 0.0 {
            return Err(DriverError::Config(format!(
                "controller_frequency must be > 0, got {}",
                self.controller_frequency
            )));
        }
        if !self.joint_precision.is_finite() || self.joint_precision < 0.0 {
            return Err(DriverError::Config(format!(
                "joint_precision must be >= 0, got {}",
                self.joint_precision
            )));
        }
        if self.topic_queue == 0 {
            return Err(DriverError::Config("topic_queue must be >= 1".to_string()));
        }
        if self.cmd_vel_settle_s < 0.0 {
            return Err(DriverError::Config(format!(
                "cmd_vel_settle_s must be >= 0, got {}",
                self.cmd_vel_settle_s
            )));
        }
        Ok(())
    }

    /// 规范化：空关节组回退到双臂，前缀补斜杠，DCM 启用时给出告警
    pub fn normalized(mut self) -> Self {
        self.motor_groups.retain(|g| !g.is_empty());
        if self.motor_groups.is_empty() {
            self.motor_groups = vec!["LArm".to_string(), "RArm".to_string()];
        }

        if !self.prefix.is_empty() && !self.prefix.ends_with('/') {
            self.prefix.push('/');
        }

        if self.use_dcm {
            warn!(
                "DCM-based control enabled: this competes with ALMotion for the same \
                 joints and can shake the robot; stop the node if shaking starts"
            );
        }
        self
    }

    /// 目标周期
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.controller_frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = DriverConfig::default();
        assert_eq!(config.controller_frequency, 15.0);
        assert_eq!(config.joint_precision, 0.1);
        assert_eq!(config.topic_queue, 10);
        assert_eq!(config.motor_groups, vec!["LArm", "RArm"]);
        assert!(!config.use_dcm);
    }

    #[test]
    fn test_empty_motor_groups_fall_back_to_arms() {
        let config = DriverConfig {
            motor_groups: vec![String::new()],
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.motor_groups, vec!["LArm", "RArm"]);
    }

    #[test]
    fn test_prefix_gets_trailing_slash() {
        let config = DriverConfig {
            prefix: "naoqi_dcm".to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.prefix, "naoqi_dcm/");

        // 已有斜杠不重复追加
        let config = DriverConfig {
            prefix: "naoqi_dcm/".to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.prefix, "naoqi_dcm/");
    }

    #[test]
    fn test_rejects_zero_frequency() {
        let config = DriverConfig {
            controller_frequency: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DriverError::Config(_))));
    }

    #[test]
    fn test_parses_partial_toml() {
        let config: DriverConfig = toml::from_str(
            r#"
            body_type = "H21"
            use_dcm = true
            motor_groups = ["Body"]
            "#,
        )
        .unwrap();
        assert_eq!(config.body_type, "H21");
        assert!(config.use_dcm);
        assert_eq!(config.motor_groups, vec!["Body"]);
        // 未给出的字段保持默认
        assert_eq!(config.controller_frequency, 15.0);
    }
}
