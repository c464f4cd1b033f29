use anyhow::{Result, anyhow};
use tokio::time::Instant;
use tracing::{error, info, trace, warn};

use s3bulkcopy::Config;
use s3bulkcopy::config::{AdmissionBoundary, ListSource};
use s3bulkcopy::pipeline::Pipeline;
use s3bulkcopy::types::token::create_pipeline_cancellation_token;

mod ctrl_c_handler;
mod indicator;
mod ui_config;

#[allow(dead_code)]
const EXIT_CODE_SUCCESS: i32 = 0;
#[allow(dead_code)]
const EXIT_CODE_ERROR: i32 = 1;
#[allow(dead_code)]
const EXIT_CODE_INVALID_ARGS: i32 = 2;
const EXIT_CODE_INTERRUPTED: i32 = 130;

pub async fn run(config: Config) -> Result<()> {
    let interrupted;

    {
        let cancellation_token = create_pipeline_cancellation_token();

        ctrl_c_handler::spawn_ctrl_c_handler(cancellation_token.clone());

        show_startup_config(&config);

        let start_time = Instant::now();
        trace!("bulk copy pipeline start.");

        let mut pipeline = Pipeline::new(config.clone(), cancellation_token.clone()).await;
        let indicator_join_handle = indicator::show_indicator(
            pipeline.get_progress_receiver(),
            ui_config::is_progress_indicator_needed(&config),
            ui_config::is_show_result_needed(&config),
            ui_config::is_progress_log_needed(&config),
        );

        pipeline.run().await;
        indicator_join_handle.await?;

        let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
        if pipeline.has_error() {
            error!(duration_sec = duration_sec, "s3bulkcopy failed.");

            return Err(anyhow!("s3bulkcopy failed."));
        }

        interrupted = cancellation_token.is_cancelled();
        if interrupted {
            warn!(duration_sec = duration_sec, "s3bulkcopy has been interrupted.");
        } else {
            trace!(duration_sec = duration_sec, "s3bulkcopy has been completed.");
        }
    }

    if interrupted {
        std::process::exit(EXIT_CODE_INTERRUPTED);
    }

    Ok(())
}

fn show_startup_config(config: &Config) {
    let startup_config = format_startup_config(config);

    if ui_config::is_show_result_needed(config) {
        println!("{startup_config}");
    } else {
        info!(message = "bulk copy started", config = startup_config);
    }
}

fn format_startup_config(config: &Config) -> String {
    let source = match &config.list_source {
        None => match config.initial_cursor().start_after() {
            Some(marker) => format!("s3://{} (after {marker})", config.source_bucket),
            None => format!("s3://{}", config.source_bucket),
        },
        Some(ListSource::Stdin) => format!("s3://{} (keys from stdin)", config.source_bucket),
        Some(ListSource::File(path)) => {
            format!("s3://{} (keys from {})", config.source_bucket, path.display())
        }
    };

    let max_requests = match config.admission_boundary {
        AdmissionBoundary::Inclusive => format!("{} (inclusive)", config.max_requests),
        AdmissionBoundary::Exclusive => format!("{} (strict)", config.max_requests),
    };

    format!(
        "source: {source},  target: s3://{},  acl: {},  storage class: {},  max requests: {max_requests},  max list buffer size: {},  key match: {}",
        config.target_bucket,
        config.canned_acl.as_str(),
        config
            .storage_class
            .as_ref()
            .map_or("(source)", |storage_class| storage_class.as_str()),
        config.max_list_buffer_size,
        config
            .key_match
            .as_ref()
            .map_or("(none)", |key_match| key_match.as_str()),
    )
}
