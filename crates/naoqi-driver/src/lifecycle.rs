//! 连接生命周期
//!
//! 状态机：`Disconnected → Connecting → Connected → Disconnected`。
//!
//! - `Connecting → Connected` 由 [`Robot::connect`] 一次性走完：会话
//!   就绪 → 唤醒确认 → 解析关节集 → 初始化各后端包装器 → 发布注册
//!   → 刚度拉到 1.0。任何一步失败都中止连接、不保留半成品状态。
//! - `Connected → Disconnected` 由 [`Robot::stop_service`] 完成：解除
//!   并发防护 → （仅全身受控时）rest 姿态 → 全体降刚度 → 清连接标志。
//!   幂等，析构中调用也安全。
//!
//! 连接状态只有生命周期组件这一个写者。

use std::sync::Arc;
use std::time::{Duration, Instant};

use naoqi_backend::{DcmBackend, MemoryBackend, MotionBackend};
use tracing::{error, info, trace, warn};

use crate::buffer::JointStateBuffer;
use crate::config::DriverConfig;
use crate::controller::Controller;
use crate::error::{ConnectFailure, DriverError};
use crate::joints::JointSet;
use crate::publish::{Diagnostics, JointStateSnapshot, StatePublisher};
use crate::reader::SensorReader;
use crate::stiffness::StiffnessCoordinator;
use crate::writer::{CommandWriter, WriteChannel};
use crate::Result;

/// 共享的后端句柄别名
pub type SharedMotion = Arc<dyn MotionBackend + Sync>;
pub type SharedDcm = Arc<dyn DcmBackend + Sync>;
pub type SharedMemory = Arc<dyn MemoryBackend + Sync>;

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// 初始状态，也是失败后的终态
    Disconnected,
    /// 连接序列进行中
    Connecting,
    /// 控制循环允许运行
    Connected,
}

/// 注入的后端集合
///
/// DCM 通道可选：只有 `use_dcm` 配置打开时才需要提供。
pub struct Backends {
    pub motion: SharedMotion,
    pub dcm: Option<SharedDcm>,
    pub memory: SharedMemory,
}

/// 已连接的机器人：生命周期与控制循环的所有协作方在此汇合
pub struct Robot {
    config: DriverConfig,
    state: ConnectionState,
    joints: JointSet,
    buffer: JointStateBuffer,
    reader: SensorReader,
    writer: CommandWriter,
    stiffness: Arc<StiffnessCoordinator>,
    motion: SharedMotion,
    publisher: Box<dyn StatePublisher>,
    diagnostics: Box<dyn Diagnostics>,
    /// 全身关节名（发布 joint state 用，含未受控关节）
    body_names: Arc<Vec<String>>,
}

impl Robot {
    /// 建立连接并完成全部初始化
    ///
    /// 失败时不保留任何半成品状态：调用方拿到的要么是可运行的
    /// `Robot`（Connected），要么是错误（外界观察仍是 Disconnected）。
    pub fn connect(
        config: DriverConfig,
        backends: Backends,
        publisher: Box<dyn StatePublisher>,
        diagnostics: Box<dyn Diagnostics>,
    ) -> Result<Robot> {
        config.validate()?;
        let Backends {
            motion,
            dcm,
            memory,
        } = backends;
        trace!("connection sequence started");

        // DCM 通道要么配置了就必须提供，要么整个忽略
        let dcm = match (config.use_dcm, dcm) {
            (true, Some(dcm)) => Some(dcm),
            (true, None) => {
                return Err(DriverError::Config(
                    "use_dcm is set but no DCM backend was provided".to_string(),
                ));
            }
            (false, _) => None,
        };

        let sole_body_group =
            config.motor_groups.len() == 1 && config.motor_groups[0] == "Body";

        // 唤醒策略：全身受控时总是唤醒；否则只有非 DCM 模式才唤醒
        // （DCM 模式下唤醒动作本身会与直写通道抢关节）
        if sole_body_group || !config.use_dcm {
            motion.wake_up().map_err(ConnectFailure::Backend)?;
        }
        if !motion.is_awake().map_err(ConnectFailure::Backend)? {
            error!("please wake up the robot to be able to set stiffness");
            return Err(ConnectFailure::NotAwake.into());
        }

        // 本体类型：配置留空时从 Memory 读取
        let body_type = if config.body_type.is_empty() {
            memory.body_type().map_err(ConnectFailure::Backend)?
        } else {
            config.body_type.clone()
        };

        // 受控关节集：连接期间不再变化
        let names = motion
            .resolve_joint_names(&config.motor_groups)
            .map_err(ConnectFailure::Backend)?;
        let joints = {
            let mut names = names;
            crate::joints::filter_mimic_joints(&mut names, &body_type);
            info!("the following joints are controlled: {names:?}");
            JointSet::from_names(names)
        };

        if config.use_dcm {
            motion
                .release_concurrence(joints.names())
                .map_err(ConnectFailure::Backend)?;
        }

        // 用受控关节集初始化每个后端包装器（每连接一次，幂等）
        memory.init(joints.names()).map_err(ConnectFailure::Backend)?;
        motion.init(joints.names()).map_err(ConnectFailure::Backend)?;
        if let Some(dcm) = &dcm {
            dcm.init(joints.names()).map_err(ConnectFailure::Backend)?;
        }

        // 发布 joint state 用的全身关节名（执行器 + 轮子）
        let body_names = Arc::new(
            motion
                .joint_names("Body")
                .map_err(ConnectFailure::Backend)?,
        );

        // 缓冲区按关节数一次性定长分配
        let buffer = JointStateBuffer::new(joints.len());
        let reader = SensorReader::new(Arc::clone(&memory));

        // 执行通道在此定死，连接期间不可切换
        let channel = match dcm {
            Some(dcm) => WriteChannel::Dcm(dcm),
            None => WriteChannel::Motion(Arc::clone(&motion)),
        };
        let writer = CommandWriter::new(channel, config.joint_precision);

        let stiffness = Arc::new(StiffnessCoordinator::new(
            Arc::clone(&motion),
            config.motor_groups.clone(),
            config.use_dcm,
            Duration::from_secs_f64(config.cmd_vel_settle_s),
        ));

        // 刚度拉升失败中止连接
        stiffness.set(1.0, 1.0).map_err(|e| match e {
            DriverError::Backend(be) => ConnectFailure::Stiffness(be).into(),
            other => other,
        })?;

        info!("naoqi dcm driver module initialized");
        Ok(Robot {
            config,
            state: ConnectionState::Connected,
            joints,
            buffer,
            reader,
            writer,
            stiffness,
            motion,
            publisher,
            diagnostics,
            body_names,
        })
    }

    // ==================== 状态查询 ====================

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn joints(&self) -> &JointSet {
        &self.joints
    }

    pub fn buffer(&self) -> &JointStateBuffer {
        &self.buffer
    }

    /// 目标周期（来自配置频率）
    pub fn period(&self) -> Duration {
        self.config.period()
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// 刚度协调器句柄（外部回调经由它请求，不直接碰后端）
    pub fn stiffness(&self) -> Arc<StiffnessCoordinator> {
        Arc::clone(&self.stiffness)
    }

    // ==================== 周期内步骤（由 ControlCycle 调度） ====================

    pub(crate) fn publish_stiffness(&self) {
        self.publisher.publish_stiffness(self.stiffness.current());
    }

    pub(crate) fn read_sensors(&mut self) -> Result<()> {
        self.reader.read(&mut self.buffer)
    }

    pub(crate) fn publish_diagnostics(&mut self) -> bool {
        self.diagnostics.publish()
    }

    pub(crate) fn update_controller<C: Controller>(
        &mut self,
        controller: &mut C,
        now: Instant,
        period: Duration,
    ) -> Result<()> {
        controller.update(self.buffer.io(self.joints.names()), now, period)?;
        Ok(())
    }

    pub(crate) fn write_commands(&self) -> Result<bool> {
        self.writer.write_if_changed(&self.buffer)
    }

    /// 发布全身关节状态快照（fire-and-forget）
    ///
    /// 读取失败只告警：一次丢失的快照不值得终止控制循环。
    pub(crate) fn publish_joint_state(&self) {
        match self.motion.angles("Body") {
            Ok(positions) => self.publisher.publish_joint_state(JointStateSnapshot {
                stamp: Instant::now(),
                names: Arc::clone(&self.body_names),
                positions,
            }),
            Err(e) => warn!("joint state snapshot read failed: {e}"),
        }
    }

    // ==================== 外部命令 ====================

    /// 外部速度命令（异步回调线程也走这条路）
    ///
    /// 全部经过刚度协调器（单写者）；DCM 模式下自动加臂刚度补偿对。
    pub fn command_velocity(&self, vx: f64, vy: f64, wz: f64) -> Result<()> {
        if !self.config.use_cmd_vel {
            warn!("velocity command ignored: use_cmd_vel is disabled");
            return Ok(());
        }
        self.stiffness.command_velocity(vx, vy, wz)
    }

    // ==================== 停机 ====================

    /// 有序停机：幂等，析构中调用也安全
    pub fn stop_service(&mut self) {
        if self.state == ConnectionState::Disconnected {
            trace!("stop_service called again, already disconnected");
            return;
        }
        info!("stopping the service");

        // 顺序固定：解除并发防护 → rest → 全体降刚度
        self.stiffness.release_arm_guard();

        let sole_body_group = self.config.motor_groups.len() == 1
            && self.config.motor_groups[0] == "Body";
        if sole_body_group {
            if let Err(e) = self.motion.rest() {
                warn!("rest pose failed during shutdown: {e}");
            }
        }

        self.stiffness.zero();
        self.state = ConnectionState::Disconnected;
        info!("service stopped");
    }
}

impl Drop for Robot {
    fn drop(&mut self) {
        // stop_service 幂等，重复调用无害
        self.stop_service();
    }
}
