//! 刚度协调器
//!
//! 刚度状态的唯一写者。控制循环、生命周期和外部速度命令都经过
//! 这里，谁都不直接对后端设置刚度：回调线程与循环各写各的会产生
//! 数据竞争，所以收敛为单写者。
//!
//! # 安全不变量
//!
//! DCM 直写通道工作期间，同一批关节在高层通道上的刚度必须为 0，
//! 否则两条通道同时驱动会使机器人抖动。任何可能冲突的高层运动
//! 命令都要包在补偿对里：压臂刚度到 0 → 发命令 → 恢复到 1，
//! 与该命令同步执行。

use std::sync::Arc;
use std::time::Duration;

use naoqi_backend::MotionBackend;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::Result;

/// 全局与分组刚度转换的单写者
pub struct StiffnessCoordinator {
    motion: Arc<dyn MotionBackend + Sync>,
    motor_groups: Vec<String>,
    /// DCM 通道是否工作（连接时定死）
    dcm_active: bool,
    /// 速度命令后、恢复臂刚度前的静置时间
    settle: Duration,
    /// 当前全局刚度（发布用）
    level: Mutex<f32>,
}

impl StiffnessCoordinator {
    pub fn new(
        motion: Arc<dyn MotionBackend + Sync>,
        motor_groups: Vec<String>,
        dcm_active: bool,
        settle: Duration,
    ) -> Self {
        Self {
            motion,
            motor_groups,
            dcm_active,
            settle,
            level: Mutex::new(0.0),
        }
    }

    /// 请求一次插值刚度转换（作用于配置的关节组）
    ///
    /// 后端拒绝（例如机器人未唤醒）时返回错误，当前值不更新。
    pub fn set(&self, level: f64, duration_s: f64) -> Result<()> {
        self.motion
            .set_group_stiffness(&self.motor_groups, level, duration_s)?;
        *self.level.lock() = level as f32;
        info!(level, "stiffness interpolation requested");
        Ok(())
    }

    /// 当前全局刚度（每周期发布）
    pub fn current(&self) -> f32 {
        *self.level.lock()
    }

    /// 在臂刚度补偿对里执行一条高层运动命令
    ///
    /// DCM 工作时观察到的序列严格为：臂刚度 0.0 → 命令 → 臂刚度 1.0，
    /// 三步同步完成。DCM 未启用时直接执行命令。
    pub fn with_arm_guard<F>(&self, command: F) -> Result<()>
    where
        F: FnOnce(&dyn MotionBackend) -> naoqi_backend::Result<()>,
    {
        if self.dcm_active {
            self.motion.set_arm_stiffness(0.0, 1.0)?;
        }

        command(self.motion.as_ref())?;

        if self.dcm_active {
            // 给本体留出执行时间，再把臂交还给高层通道
            std::thread::sleep(self.settle);
            self.motion.set_arm_stiffness(1.0, 1.0)?;
        }
        Ok(())
    }

    /// 外部速度命令入口（回调线程也走这里，不直接碰后端）
    pub fn command_velocity(&self, vx: f64, vy: f64, wz: f64) -> Result<()> {
        self.with_arm_guard(|motion| motion.move_toward(vx, vy, wz))
    }

    /// 停机第一步：解除 DCM 与高层通道的并发防护
    ///
    /// 停机路径上的错误只告警不传播，停机必须走完。
    pub(crate) fn release_arm_guard(&self) {
        if self.dcm_active {
            if let Err(e) = self.motion.set_arm_stiffness(0.0, 1.0) {
                warn!("releasing arm stiffness failed during shutdown: {e}");
            }
        }
    }

    /// 停机最后一步：全体降刚度到 0
    pub(crate) fn zero(&self) {
        if let Err(e) = self.set(0.0, 1.0) {
            warn!("zeroing stiffness failed during shutdown: {e}");
        }
    }
}
