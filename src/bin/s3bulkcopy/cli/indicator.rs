use std::io;
use std::io::Write;

use async_channel::Receiver;
use indicatif::{HumanBytes, HumanCount, HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};
use simple_moving_average::{SMA, SumTreeSMA};
use tokio::task::JoinHandle;
use tracing::info;

use s3bulkcopy::types::ProgressSnapshot;

const MOVING_AVERAGE_PERIOD_SECS: usize = 10;

/// Renders progress snapshots until the final one arrives or the channel is closed.
pub fn show_indicator(
    progress_receiver: Receiver<ProgressSnapshot>,
    show_progress: bool,
    show_result: bool,
    log_progress: bool,
) -> JoinHandle<()> {
    let progress_style = ProgressStyle::with_template("{wide_msg}").unwrap();
    let progress_text = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    progress_text.set_style(progress_style);

    tokio::spawn(async move {
        let mut ma_transferred_bytes = SumTreeSMA::<_, u64, MOVING_AVERAGE_PERIOD_SECS>::new();
        let mut ma_succeeded_count = SumTreeSMA::<_, u64, MOVING_AVERAGE_PERIOD_SECS>::new();

        let mut last_bytes_transferred: u64 = 0;
        let mut last_succeeded: u64 = 0;

        while let Ok(snapshot) = progress_receiver.recv().await {
            if log_progress {
                log_snapshot(&snapshot);
            }

            if snapshot.is_final {
                if show_result {
                    progress_text.set_style(ProgressStyle::with_template("{msg}").unwrap());
                    progress_text.finish_with_message(format_result(&snapshot));

                    println!();
                    io::stdout().flush().unwrap()
                }

                return;
            }

            ma_transferred_bytes
                .add_sample(snapshot.bytes_transferred.saturating_sub(last_bytes_transferred));
            ma_succeeded_count.add_sample(snapshot.succeeded.saturating_sub(last_succeeded));
            last_bytes_transferred = snapshot.bytes_transferred;
            last_succeeded = snapshot.succeeded;

            if show_progress {
                progress_text.set_message(format_progress(
                    &snapshot,
                    ma_transferred_bytes.get_average(),
                    ma_succeeded_count.get_average(),
                ));
            }
        }
    })
}

fn format_progress(snapshot: &ProgressSnapshot, bytes_per_sec: u64, objects_per_sec: u64) -> String {
    format!(
        "{:>3} | {:>3}/sec,  copied {:>3} objects | {:>3} objects/sec,  failed {} objects,  queued {},  in-flight {},  cursor {}",
        HumanBytes(snapshot.bytes_transferred),
        HumanBytes(bytes_per_sec).to_string(),
        snapshot.succeeded,
        HumanCount(objects_per_sec).to_string(),
        snapshot.failed,
        snapshot.queue_depth,
        snapshot.in_flight,
        snapshot.cursor,
    )
}

fn format_result(snapshot: &ProgressSnapshot) -> String {
    format!(
        "{:>3} | {:>3}/sec ({:.2} Mbps),  copied {:>3} objects | {:.1} objects/sec,  failed {} objects,  duration {}",
        HumanBytes(snapshot.bytes_transferred),
        HumanBytes(snapshot.bytes_per_sec() as u64),
        snapshot.megabits_per_sec(),
        snapshot.succeeded,
        snapshot.objects_per_sec(),
        snapshot.failed,
        HumanDuration(snapshot.elapsed),
    )
}

fn log_snapshot(snapshot: &ProgressSnapshot) {
    info!(
        message = if snapshot.is_final {
            "bulk copy summary"
        } else {
            "bulk copy progress"
        },
        transferred_byte = snapshot.bytes_transferred,
        transferred_byte_per_sec = snapshot.bytes_per_sec(),
        transferred_megabit_per_sec = snapshot.megabits_per_sec(),
        succeeded = snapshot.succeeded,
        succeeded_per_sec = snapshot.objects_per_sec(),
        failed = snapshot.failed,
        queue_depth = snapshot.queue_depth,
        in_flight = snapshot.in_flight,
        cursor = %snapshot.cursor,
        duration_sec = snapshot.elapsed.as_secs_f64(),
    );
}
