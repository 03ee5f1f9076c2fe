use svcd_kernel::domain::config::{LogConfig, LogRotation};
use svcd_logger::{Logger, LoggerBuilder, Rotation};

/// Logger settings for the `log` config section. `RUST_LOG` still overrides `level`.
pub fn logger(log: &LogConfig) -> LoggerBuilder {
    Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(log.level.as_str())
        .json(log.json)
        .directory(log.directory.clone())
        .rotation(rotation(log.rotation))
        .max_files(log.max_files)
}

const fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_follows_config() {
        assert_eq!(rotation(LogRotation::Minutely), Rotation::MINUTELY);
        assert_eq!(rotation(LogRotation::Hourly), Rotation::HOURLY);
        assert_eq!(rotation(LogRotation::Daily), Rotation::DAILY);
        assert_eq!(rotation(LogRotation::Never), Rotation::NEVER);
    }

    #[test]
    fn builder_carries_log_section() {
        let log = LogConfig { rotation: LogRotation::Hourly, max_files: 3, ..LogConfig::default() };
        let rendered = format!("{:?}", logger(&log));

        assert!(rendered.contains("max_files: 3"), "{rendered}");
        assert!(rendered.contains("svcd-server"), "{rendered}");
    }
}
