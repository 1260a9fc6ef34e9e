//! # naoqi-dcm CLI
//!
//! 驱动核心的命令行运行器。后端使用进程内 mock 机器人，
//! 便于在没有真实本体的机器上验证控制循环行为。
//!
//! ```bash
//! # 默认配置跑控制循环，Ctrl+C 有序停机
//! naoqi-dcm run
//!
//! # 从 TOML 配置启动，限定周期数
//! naoqi-dcm --config driver.toml run --cycles 100
//!
//! # 打印生效的配置
//! naoqi-dcm --config driver.toml show-config
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use naoqi_backend::mock::MockRobot;
use naoqi_driver::publish::{ChannelPublisher, Diagnostics};
use naoqi_driver::{Backends, ControlCycle, DriverConfig, HoldPosition, Robot};

/// naoqi-dcm - 控制循环运行器
#[derive(Parser, Debug)]
#[command(name = "naoqi-dcm")]
#[command(about = "Run the naoqi-dcm control loop against a mock robot", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML 配置文件路径（缺省用内置默认值）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 连接并运行控制循环
    Run {
        /// 限定运行周期数（缺省一直跑到 Ctrl+C）
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// 打印生效的配置
    ShowConfig,
}

/// 把 Ctrl+C 映射成诊断 not-ok：控制循环据此走有序停机路径
/// （降刚度、必要时 rest），而不是硬退出。
struct ShutdownFlagDiagnostics {
    shutdown: Arc<AtomicBool>,
}

impl Diagnostics for ShutdownFlagDiagnostics {
    fn publish(&mut self) -> bool {
        !self.shutdown.load(Ordering::Relaxed)
    }
}

fn load_config(path: &Option<PathBuf>) -> Result<DriverConfig> {
    let config = match path {
        Some(path) => DriverConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DriverConfig::default(),
    };
    Ok(config.normalized())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::ShowConfig => {
            println!("{config:#?}");
            Ok(())
        }
        Commands::Run { cycles } => run(config, cycles),
    }
}

fn run(config: DriverConfig, cycles: Option<u64>) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            info!("shutdown requested");
            shutdown.store(true, Ordering::Relaxed);
        })
        .context("installing Ctrl+C handler")?;
    }

    let mock = MockRobot::new();
    let backends = Backends {
        motion: Arc::new(mock.clone()),
        dcm: Some(Arc::new(mock.clone())),
        memory: Arc::new(mock.clone()),
    };

    let (publisher, receivers) = ChannelPublisher::new(config.topic_queue);

    // 消费端：低频打印关节状态快照
    let log_every = config.controller_frequency.max(1.0) as usize;
    std::thread::spawn(move || {
        let mut count = 0usize;
        while let Ok(snapshot) = receivers.joint_state_rx.recv() {
            count += 1;
            if count % log_every == 0 {
                info!(
                    joints = snapshot.names.len(),
                    first = snapshot.positions.first().copied().unwrap_or(0.0),
                    "joint state snapshot"
                );
            }
        }
    });

    let frequency = config.controller_frequency;
    let mut robot = Robot::connect(
        config,
        backends,
        Box::new(publisher),
        Box::new(ShutdownFlagDiagnostics {
            shutdown: Arc::clone(&shutdown),
        }),
    )?;

    let mut cycle = ControlCycle::new(frequency)?;
    if let Some(max) = cycles {
        cycle = cycle.with_max_cycles(max);
    }

    let exit = cycle.run(&mut robot, &mut HoldPosition)?;
    info!("control loop finished: {exit:?}");

    // 限定周期数跑完时机器人还连着，补一次有序停机
    robot.stop_service();
    Ok(())
}
