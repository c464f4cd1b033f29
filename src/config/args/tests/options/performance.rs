#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--max-sockets",
            "20",
            "--max-requests",
            "2",
            "--max-list-buffer-size",
            "50",
            "--max-keys",
            "10",
            "--strict-max-requests",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(
            config
                .client_config
                .connection_semaphore
                .available_permits(),
            20
        );
        assert_eq!(config.max_requests, 2);
        assert_eq!(config.max_list_buffer_size, 50);
        assert_eq!(config.max_keys, 10);
        assert_eq!(config.admission_boundary, AdmissionBoundary::Exclusive);
    }

    #[test]
    fn zero_values_are_rejected() {
        init_dummy_tracing_subscriber();

        for option in [
            "--max-sockets",
            "--max-requests",
            "--max-list-buffer-size",
            "--max-keys",
        ] {
            let args = vec![
                "s3bulkcopy",
                "--source",
                "source-bucket",
                "--target",
                "target-bucket",
                option,
                "0",
            ];

            assert!(build_config_from_args(args).is_err(), "{option}");
        }
    }

    #[test]
    fn max_keys_above_page_limit() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--max-keys",
            "1001",
        ];

        assert!(build_config_from_args(args).is_err());
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
