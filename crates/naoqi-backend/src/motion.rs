//! 高层运动通道契约（ALMotion 语义）
//!
//! 这是默认的执行通道：命令经过机器人内部的运动仲裁后下发。
//! 与 [`crate::DcmBackend`] 低层通道互斥：两者同时对同一批关节
//! 施加刚度会导致双重驱动（机器人抖动），由驱动核心的刚度协调器
//! 负责规避。

use crate::Result;

/// 高层运动后端
///
/// 所有调用都是同步阻塞的，由调用方（控制循环线程）承担阻塞成本。
/// 单个调用不设超时：后端挂起会使整个控制循环停滞，这是文档化的
/// 已知限制，而不是待修复项。
pub trait MotionBackend: Send {
    /// 唤醒机器人（上电并进入初始姿态）
    fn wake_up(&self) -> Result<()>;

    /// 机器人是否处于唤醒状态
    ///
    /// 刚度设置要求机器人已唤醒；连接序列在设置刚度前必须检查。
    fn is_awake(&self) -> Result<bool>;

    /// 对若干关节组做刚度插值
    ///
    /// - `level`: 目标刚度，`[0.0, 1.0]`，0 为完全柔顺，1 为完全刚性
    /// - `duration_s`: 插值时长（秒）
    ///
    /// 机器人未唤醒时后端会拒绝请求（`BackendError::StiffnessRejected`）。
    fn set_group_stiffness(&self, groups: &[String], level: f64, duration_s: f64) -> Result<()>;

    /// 单独设置双臂刚度
    ///
    /// DCM 通道工作时，高层运动命令（如底盘移动）会摆动手臂；
    /// 先把高层通道的手臂刚度压到 0 再发命令，避免与 DCM 争抢。
    fn set_arm_stiffness(&self, level: f64, duration_s: f64) -> Result<()>;

    /// 查询单个关节组包含的关节名（固定顺序）
    fn joint_names(&self, group: &str) -> Result<Vec<String>>;

    /// 把若干关节组展开为有序关节名序列
    ///
    /// 返回顺序即后续所有按关节索引的数组的规范顺序。
    fn resolve_joint_names(&self, groups: &[String]) -> Result<Vec<String>>;

    /// 读取某个关节组的当前角度（弧度，与 `joint_names` 同序）
    fn angles(&self, group: &str) -> Result<Vec<f64>>;

    /// 以受控关节集初始化本通道（每次连接一次，幂等）
    fn init(&self, joint_names: &[String]) -> Result<()>;

    /// 写入整组关节命令（与受控关节集同序同长）
    fn write_commands(&self, commands: &[f64]) -> Result<()>;

    /// 底盘速度移动（vx, vy, wz）
    fn move_toward(&self, vx: f64, vy: f64, wz: f64) -> Result<()>;

    /// 进入 rest 姿态（蹲下并断电）
    fn rest(&self) -> Result<()>;

    /// 释放受控关节在高层通道上的刚度占用
    ///
    /// DCM 通道启用时在连接阶段调用一次，之后受控关节完全交给 DCM。
    fn release_concurrence(&self, joint_names: &[String]) -> Result<()>;
}
