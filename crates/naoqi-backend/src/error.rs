//! 后端层错误类型定义

use thiserror::Error;

/// 后端调用错误
///
/// 每个后端调用边界都返回显式 Result，不依赖异常或进程终止。
/// 驱动核心按错误分类决定是中止连接还是终止控制循环。
#[derive(Error, Debug)]
pub enum BackendError {
    /// 会话不可用（未连接或已断开）
    #[error("Backend session unavailable: {0}")]
    SessionUnavailable(String),

    /// 机器人未唤醒，拒绝刚度/运动请求
    #[error("Robot is not awake")]
    NotAwake,

    /// 刚度插值请求被后端拒绝
    #[error("Stiffness request rejected: {0}")]
    StiffnessRejected(String),

    /// 关节命令写入失败
    #[error("Joint command write failed: {0}")]
    WriteFailed(String),

    /// 未知的关节组名
    #[error("Unknown motor group: {0}")]
    UnknownGroup(String),

    /// 后端调用返回了无效数据
    #[error("Invalid backend reply: {0}")]
    InvalidReply(String),
}
