//! 低层直写通道契约（DCM 语义）
//!
//! DCM 绕过机器人内部的运动仲裁，直接把命令送到执行器时间线上，
//! 适合高频控制。代价是与高层通道（ALMotion）产生刚度并发：
//! 选择哪条通道在连接时一次性确定，连接期间不可切换。

use crate::Result;

/// 低层 DCM 后端
pub trait DcmBackend: Send {
    /// 以受控关节集初始化命令别名（每次连接一次，幂等）
    fn init(&self, joint_names: &[String]) -> Result<()>;

    /// 写入整组关节命令（与受控关节集同序同长）
    fn write_commands(&self, commands: &[f64]) -> Result<()>;
}
