#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_default_value() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        let timeout_config = &config.client_config.cli_timeout_config;
        assert!(timeout_config.operation_timeout_milliseconds.is_none());
        assert!(
            timeout_config
                .operation_attempt_timeout_milliseconds
                .is_none()
        );
        assert!(timeout_config.connect_timeout_milliseconds.is_none());
        assert!(timeout_config.read_timeout_milliseconds.is_none());
        assert!(config.transfer_timeout_milliseconds.is_none());
    }

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--operation-timeout-milliseconds",
            "1000",
            "--operation-attempt-timeout-milliseconds",
            "2000",
            "--connect-timeout-milliseconds",
            "3000",
            "--read-timeout-milliseconds",
            "4000",
            "--transfer-timeout-milliseconds",
            "5000",
        ];

        let config = build_config_from_args(args).unwrap();

        let timeout_config = &config.client_config.cli_timeout_config;
        assert_eq!(timeout_config.operation_timeout_milliseconds, Some(1000));
        assert_eq!(
            timeout_config.operation_attempt_timeout_milliseconds,
            Some(2000)
        );
        assert_eq!(timeout_config.connect_timeout_milliseconds, Some(3000));
        assert_eq!(timeout_config.read_timeout_milliseconds, Some(4000));
        assert_eq!(config.transfer_timeout_milliseconds, Some(5000));
    }

    #[test]
    fn zero_transfer_timeout() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--transfer-timeout-milliseconds",
            "0",
        ];

        assert!(build_config_from_args(args).is_err());
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
