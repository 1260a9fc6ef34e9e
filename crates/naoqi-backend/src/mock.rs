//! 进程内 Mock 机器人（无硬件测试）
//!
//! [`MockRobot`] 同时实现三个后端契约，内部共享一份状态：
//!
//! - 确定性：固定的 NAO 风格关节表，无随机抖动
//! - 可观测：按时间顺序记录每一次后端调用（[`MockEvent`]），
//!   用于断言调用序列（例如刚度补偿对 `[0.0, move, 1.0]`）
//! - 可注入故障：未唤醒、拒绝刚度、写入失败、传感器短读
//!
//! `MockRobot` 是 `Clone` 的（内部 `Arc`），克隆体共享同一机器人，
//! 可以分别作为 Motion / DCM / Memory 注入驱动核心。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{BackendError, DcmBackend, MemoryBackend, MotionBackend, Result};

/// 记录下来的一次后端调用
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    WakeUp,
    StiffnessSet { groups: Vec<String>, level: f64 },
    ArmStiffness(f64),
    MotionWrite(Vec<f64>),
    DcmWrite(Vec<f64>),
    MoveToward { vx: f64, vy: f64, wz: f64 },
    Rest,
    ConcurrenceReleased(Vec<String>),
}

#[derive(Debug)]
struct MockState {
    awake: bool,
    body_type: String,
    /// 组名 -> 关节名（固定顺序）
    groups: Vec<(String, Vec<String>)>,
    /// 关节名 -> 当前角度（弧度）
    positions: HashMap<String, f64>,
    /// Memory 订阅的传感器键顺序
    memory_keys: Vec<String>,
    /// Motion / DCM 各自 init 过的受控关节集
    motion_joints: Vec<String>,
    dcm_joints: Vec<String>,
    events: Vec<MockEvent>,
    // 故障注入开关
    reject_stiffness: bool,
    fail_writes: bool,
    short_read: bool,
}

/// 确定性的进程内机器人
#[derive(Clone)]
pub struct MockRobot {
    state: Arc<Mutex<MockState>>,
}

const HEAD: &[&str] = &["HeadYaw", "HeadPitch"];
const LARM: &[&str] = &[
    "LShoulderPitch",
    "LShoulderRoll",
    "LElbowYaw",
    "LElbowRoll",
    "LWristYaw",
    "LHand",
];
const RARM: &[&str] = &[
    "RShoulderPitch",
    "RShoulderRoll",
    "RElbowYaw",
    "RElbowRoll",
    "RWristYaw",
    "RHand",
];
const WHEELS: &[&str] = &["WheelFL", "WheelFR", "WheelB"];

impl MockRobot {
    /// 创建默认机器人：已唤醒，本体类型 "H25"
    pub fn new() -> Self {
        let to_vec = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let mut body = to_vec(HEAD);
        body.extend(to_vec(LARM));
        body.extend(to_vec(RARM));
        body.extend(to_vec(WHEELS));

        let groups = vec![
            ("Head".to_string(), to_vec(HEAD)),
            ("LArm".to_string(), to_vec(LARM)),
            ("RArm".to_string(), to_vec(RARM)),
            ("Body".to_string(), body.clone()),
        ];

        let positions = body.iter().map(|name| (name.clone(), 0.0)).collect();

        MockRobot {
            state: Arc::new(Mutex::new(MockState {
                awake: true,
                body_type: "H25".to_string(),
                groups,
                positions,
                memory_keys: Vec::new(),
                motion_joints: Vec::new(),
                dcm_joints: Vec::new(),
                events: Vec::new(),
                reject_stiffness: false,
                fail_writes: false,
                short_read: false,
            })),
        }
    }

    // ==================== 测试配置 ====================

    pub fn set_awake(&self, awake: bool) {
        self.state.lock().awake = awake;
    }

    pub fn set_body_type(&self, body_type: &str) {
        self.state.lock().body_type = body_type.to_string();
    }

    /// 模拟传感器：直接设置某个关节的当前角度
    pub fn set_angle(&self, joint: &str, angle: f64) {
        self.state.lock().positions.insert(joint.to_string(), angle);
    }

    pub fn angle_of(&self, joint: &str) -> Option<f64> {
        self.state.lock().positions.get(joint).copied()
    }

    /// 之后的刚度请求一律被拒绝
    pub fn reject_stiffness(&self, reject: bool) {
        self.state.lock().reject_stiffness = reject;
    }

    /// 之后的关节写入一律失败
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// 之后的批量传感器读取少返回一个值（模拟短读）
    pub fn short_read(&self, short: bool) {
        self.state.lock().short_read = short;
    }

    // ==================== 调用记录 ====================

    pub fn events(&self) -> Vec<MockEvent> {
        self.state.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    fn record(&self, event: MockEvent) {
        self.state.lock().events.push(event);
    }

    fn group_joints(&self, group: &str) -> Result<Vec<String>> {
        let state = self.state.lock();
        state
            .groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, joints)| joints.clone())
            .ok_or_else(|| BackendError::UnknownGroup(group.to_string()))
    }
}

impl Default for MockRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionBackend for MockRobot {
    fn wake_up(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.awake = true;
        state.events.push(MockEvent::WakeUp);
        Ok(())
    }

    fn is_awake(&self) -> Result<bool> {
        Ok(self.state.lock().awake)
    }

    fn set_group_stiffness(&self, groups: &[String], level: f64, _duration_s: f64) -> Result<()> {
        let mut state = self.state.lock();
        if !state.awake {
            return Err(BackendError::NotAwake);
        }
        if state.reject_stiffness {
            return Err(BackendError::StiffnessRejected("injected fault".to_string()));
        }
        state.events.push(MockEvent::StiffnessSet {
            groups: groups.to_vec(),
            level,
        });
        Ok(())
    }

    fn set_arm_stiffness(&self, level: f64, _duration_s: f64) -> Result<()> {
        let mut state = self.state.lock();
        if state.reject_stiffness {
            return Err(BackendError::StiffnessRejected("injected fault".to_string()));
        }
        state.events.push(MockEvent::ArmStiffness(level));
        Ok(())
    }

    fn joint_names(&self, group: &str) -> Result<Vec<String>> {
        self.group_joints(group)
    }

    fn resolve_joint_names(&self, groups: &[String]) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for group in groups {
            names.extend(self.group_joints(group)?);
        }
        Ok(names)
    }

    fn angles(&self, group: &str) -> Result<Vec<f64>> {
        let joints = self.group_joints(group)?;
        let state = self.state.lock();
        Ok(joints
            .iter()
            .map(|name| state.positions.get(name).copied().unwrap_or(0.0))
            .collect())
    }

    fn init(&self, joint_names: &[String]) -> Result<()> {
        self.state.lock().motion_joints = joint_names.to_vec();
        Ok(())
    }

    fn write_commands(&self, commands: &[f64]) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(BackendError::WriteFailed("injected fault".to_string()));
        }
        let joints = state.motion_joints.clone();
        for (name, &command) in joints.iter().zip(commands) {
            state.positions.insert(name.clone(), command);
        }
        state.events.push(MockEvent::MotionWrite(commands.to_vec()));
        Ok(())
    }

    fn move_toward(&self, vx: f64, vy: f64, wz: f64) -> Result<()> {
        self.record(MockEvent::MoveToward { vx, vy, wz });
        Ok(())
    }

    fn rest(&self) -> Result<()> {
        self.record(MockEvent::Rest);
        Ok(())
    }

    fn release_concurrence(&self, joint_names: &[String]) -> Result<()> {
        self.record(MockEvent::ConcurrenceReleased(joint_names.to_vec()));
        Ok(())
    }
}

impl DcmBackend for MockRobot {
    fn init(&self, joint_names: &[String]) -> Result<()> {
        self.state.lock().dcm_joints = joint_names.to_vec();
        Ok(())
    }

    fn write_commands(&self, commands: &[f64]) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(BackendError::WriteFailed("injected fault".to_string()));
        }
        let joints = state.dcm_joints.clone();
        for (name, &command) in joints.iter().zip(commands) {
            state.positions.insert(name.clone(), command);
        }
        state.events.push(MockEvent::DcmWrite(commands.to_vec()));
        Ok(())
    }
}

impl MemoryBackend for MockRobot {
    fn init(&self, joint_names: &[String]) -> Result<()> {
        self.state.lock().memory_keys = joint_names.to_vec();
        Ok(())
    }

    fn read_all_angles(&self) -> Result<Vec<f32>> {
        let state = self.state.lock();
        let mut values: Vec<f32> = state
            .memory_keys
            .iter()
            .map(|name| state.positions.get(name).copied().unwrap_or(0.0) as f32)
            .collect();
        if state.short_read {
            values.pop();
        }
        Ok(values)
    }

    fn body_type(&self) -> Result<String> {
        Ok(self.state.lock().body_type.clone())
    }
}
