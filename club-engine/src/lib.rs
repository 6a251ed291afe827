//! Club Engine - 飞行俱乐部核心引擎
//!
//! # 架构概述
//!
//! Reservation admission, flight lifecycle, billing and maintenance status
//! for a shared-fleet flying club, on an embedded redb database.
//!
//! # 模块结构
//!
//! ```text
//! club-engine/src/
//! ├── core/          # 配置
//! ├── db/            # redb 存储与索引
//! ├── club/          # ClubManager, 上下文, 错误, 事件
//! ├── policy/        # tier → settings → defaults 合并
//! ├── reservations/  # 预订准入规则
//! ├── flights/       # check-in / check-out / cancel
//! ├── billing/       # 计费, 发票, 会费
//! ├── maintenance/   # 维护状态与记录
//! ├── admin.rs       # 会员, 等级, 飞机, 设置
//! ├── services/      # 油价, 附件存储
//! └── utils/         # 日志, 时区工具
//! ```

pub mod admin;
pub mod billing;
pub mod club;
pub mod core;
pub mod db;
pub mod flights;
pub mod maintenance;
pub mod policy;
pub mod reservations;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use club::{ClubError, ClubEvent, ClubManager, ClubResult};
pub use crate::core::Config;
pub use db::ClubStorage;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: dotenv, 工作目录, 日志
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    std::fs::create_dir_all(&config.work_dir)?;
    std::fs::create_dir_all(&config.upload_dir)?;
    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(config)
}
