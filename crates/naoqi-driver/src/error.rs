//! 驱动核心错误类型定义
//!
//! 错误分类决定处置方式（核心不做任何重试）：
//!
//! - 连接期致命（[`ConnectFailure`]）：中止 connect，不保留任何半成品状态
//! - 周期致命：控制器 update 失败或后端写入失败 → 记日志并终止本次运行
//! - 周期可恢复：诊断报告 not-ok → 有序停机（降刚度 + rest），不是崩溃
//! - 数据完整性：传感器数量与关节数不符 → 立即失败，绝不静默截断

use naoqi_backend::BackendError;
use thiserror::Error;

use crate::controller::ControllerError;

/// 驱动核心错误
#[derive(Error, Debug)]
pub enum DriverError {
    /// 连接序列失败（连接期致命）
    #[error("Connect failed: {0}")]
    Connect(#[from] ConnectFailure),

    /// 后端调用失败（读/写边界，周期致命）
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// 传感器批量读取返回的数量与受控关节数不符（数据完整性）
    #[error("Sensor value count mismatch: expected {expected}, got {actual}")]
    SensorCountMismatch { expected: usize, actual: usize },

    /// 配置无效
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// 通用控制器 update 失败（周期致命）
    #[error("Controller update failed: {0}")]
    Controller(#[from] ControllerError),
}

/// 连接序列中的失败点
#[derive(Error, Debug)]
pub enum ConnectFailure {
    /// 机器人未唤醒，无法设置刚度
    #[error("robot is not awake, wake it up before setting stiffness")]
    NotAwake,

    /// 初始刚度拉升失败
    #[error("initial stiffness raise failed: {0}")]
    Stiffness(#[source] BackendError),

    /// 后端包装器初始化失败
    #[error("backend init failed: {0}")]
    Backend(#[source] BackendError),
}
