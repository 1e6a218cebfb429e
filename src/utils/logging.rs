// 日志工具模块
//
// 基于 flexi_logger：日志写入按大小轮转的文件，警告同时输出到 stderr，
// 命令行的计划结果单独输出到 stdout，两者互不混杂。

use std::sync::Mutex;

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming,
    WriteMode,
};

use crate::config::LogConfig;

/// 全局日志句柄，退出前用于 flush
static LOGGER_HANDLE: Mutex<Option<LoggerHandle>> = Mutex::new(None);

/// 关闭日志的级别名
pub const LEVEL_OFF: &str = "off";

/// 初始化日志系统
///
/// `level` 为 `off` 时不启动 logger。同一进程只能初始化一次。
///
/// # Examples
/// ```no_run
/// use joinopt::config::Config;
/// use joinopt::utils::logging;
///
/// let config = Config::default();
/// logging::init(&config.log).expect("日志初始化失败");
/// ```
pub fn init(config: &LogConfig) -> Result<(), FlexiLoggerError> {
    if config.level.eq_ignore_ascii_case(LEVEL_OFF) {
        return Ok(());
    }

    let handle = Logger::try_with_str(&config.level)?
        .log_to_file(
            FileSpec::default()
                .basename(&config.file)
                .directory(&config.dir),
        )
        .rotate(
            Criterion::Size(config.max_file_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .write_mode(WriteMode::Async)
        .append()
        .start()?;

    if let Ok(mut guard) = LOGGER_HANDLE.lock() {
        *guard = Some(handle);
    }

    log::info!("日志系统初始化完成: {}/{} ({})", config.dir, config.file, config.level);
    Ok(())
}

/// 刷新并关闭日志系统
///
/// 等待异步写线程把已提交的日志写完
pub fn shutdown() {
    if let Ok(mut guard) = LOGGER_HANDLE.lock() {
        if let Some(handle) = guard.take() {
            handle.flush();
            handle.shutdown();
        }
    }
}

/// 日志系统是否已初始化
pub fn is_initialized() -> bool {
    LOGGER_HANDLE
        .lock()
        .map(|guard| guard.is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_level_does_not_start_logger() {
        let config = LogConfig {
            level: "OFF".to_string(),
            ..LogConfig::default()
        };
        assert!(init(&config).is_ok());
        assert!(!is_initialized());
        shutdown();
    }
}
