use crate::policy::PolicyDefaults;
use chrono_tz::Tz;
use std::path::PathBuf;

/// 俱乐部引擎配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_PATH | {WORK_DIR}/club.redb | redb 数据库文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | - | 日志目录，设置后按天滚动写文件 |
/// | CLUB_TIMEZONE | America/Los_Angeles | 俱乐部时区 (IANA) |
/// | METER_TOLERANCE_HOURS | 0.0 | Hobbs/Tach 允许的回退量 |
/// | FUEL_PRICE_URL | - | 油价服务地址，未设置则不刷新 |
/// | FUEL_PRICE_TIMEOUT_MS | 10000 | 油价请求超时(毫秒) |
/// | UPLOAD_DIR | {WORK_DIR}/uploads | 附件存储目录 |
/// | MAX_UPLOAD_BYTES | 10485760 | 附件大小上限 |
/// | DEFAULT_BOOKING_WINDOW_DAYS | 90 | 内置预约窗口 |
/// | DEFAULT_MAX_TRIP_LENGTH_DAYS | 3 | 内置最长行程天数 |
/// | DEFAULT_MAX_RESERVATIONS | 3 | 内置最多有效预约数 |
/// | DEFAULT_HOURLY_RATE_DISCOUNT | 0 | 内置小时费率折扣 (%) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/club CLUB_TIMEZONE=America/Denver cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub database_path: PathBuf,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 俱乐部时区，所有日历判断都在此时区进行
    pub timezone: Tz,
    /// 签到读数低于飞机当前读数的容差 (小时)
    pub meter_tolerance: f64,
    pub fuel_price_url: Option<String>,
    pub fuel_price_timeout_ms: u64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// 没有会员等级和俱乐部设置时的兜底策略
    pub policy_defaults: PolicyDefaults,
}

const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// 容差必须是非负有限值，否则回退到 0.0
///
/// NaN 会让回退检查永远不成立，负数会拒绝完全一致的读数。
pub fn sanitize_meter_tolerance(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(meter_tolerance = value, "Invalid meter tolerance, using 0.0");
        0.0
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&work_dir).join("club.redb"));
        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&work_dir).join("uploads"));

        let timezone = match std::env::var("CLUB_TIMEZONE") {
            Ok(name) => name.parse::<Tz>().unwrap_or_else(|e| {
                tracing::warn!(timezone = %name, error = %e, "Invalid CLUB_TIMEZONE, using default");
                DEFAULT_TIMEZONE
            }),
            Err(_) => DEFAULT_TIMEZONE,
        };

        let builtin = PolicyDefaults::default();
        let policy_defaults = PolicyDefaults {
            booking_window_days: env_parse("DEFAULT_BOOKING_WINDOW_DAYS")
                .unwrap_or(builtin.booking_window_days),
            max_trip_length_days: env_parse("DEFAULT_MAX_TRIP_LENGTH_DAYS")
                .unwrap_or(builtin.max_trip_length_days),
            max_reservations: env_parse("DEFAULT_MAX_RESERVATIONS")
                .unwrap_or(builtin.max_reservations),
            hourly_rate_discount: env_parse("DEFAULT_HOURLY_RATE_DISCOUNT")
                .unwrap_or(builtin.hourly_rate_discount),
        };

        Self {
            work_dir,
            database_path,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            timezone,
            meter_tolerance: env_parse("METER_TOLERANCE_HOURS")
                .map(sanitize_meter_tolerance)
                .unwrap_or(0.0),
            fuel_price_url: std::env::var("FUEL_PRICE_URL").ok(),
            fuel_price_timeout_ms: env_parse("FUEL_PRICE_TIMEOUT_MS").unwrap_or(10_000),
            upload_dir,
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES").unwrap_or(10 * 1024 * 1024),
            policy_defaults,
        }
    }

    /// 使用自定义工作目录 (测试场景)
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = PathBuf::from(&config.work_dir).join("club.redb");
        config.upload_dir = PathBuf::from(&config.work_dir).join("uploads");
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
