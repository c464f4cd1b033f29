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
            "--acl",
            "bucket-owner-full-control",
            "--storage-class",
            "REDUCED_REDUNDANCY",
            "--no-error-output",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.canned_acl, ObjectCannedAcl::BucketOwnerFullControl);
        assert_eq!(config.storage_class, Some(StorageClass::ReducedRedundancy));
        assert!(config.no_error_output);
    }

    #[test]
    fn invalid_acl() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--acl",
            "everyone",
        ];

        assert!(build_config_from_args(args).is_err());
    }

    #[test]
    fn invalid_storage_class() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--storage-class",
            "COLD",
        ];

        assert!(build_config_from_args(args).is_err());
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
