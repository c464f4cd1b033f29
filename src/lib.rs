/*!
# Overview
s3bulkcopy copies every object of one S3 bucket into another with server-side `CopyObject` calls.
It is built for buckets holding millions of objects: memory, outbound connections and in-flight
requests all stay bounded for the whole run.

## Features
- Flow-controlled
  Objects are listed page by page into a bounded work queue. Listing pauses while the queue is full,
  and transfers are admitted only while fewer than `--max-requests` copies are in flight.

- Two ways to find work
  - Remote listing of the source bucket (`ListObjectsV2`), resumable with `--marker`.
  - A newline separated list of keys from a file or stdin (`--list-file`).

- Filtering
  Keys can be filtered by a regular expression (`--key-match`).

- Copy options
  Canned ACL, storage class override, metadata is always copied from the source object.

- Live progress
  Queue depth, in-flight count, succeeded, failed, bytes and throughput once per second.

## As a library
s3bulkcopy CLI is a very thin wrapper of the s3bulkcopy library.
The library accepts the same arguments as the CLI.

Example usage
=============

```Toml
[dependencies]
s3bulkcopy = "0.1"
tokio = { version = "1", features = ["full"] }
```

```no_run
use s3bulkcopy::config::Config;
use s3bulkcopy::config::args::parse_from_args;
use s3bulkcopy::pipeline::Pipeline;
use s3bulkcopy::types::token::create_pipeline_cancellation_token;

#[tokio::main]
async fn main() {
    // You can use all the arguments for s3bulkcopy CLI.
    let args = vec![
        "program_name",
        "--source",
        "source-bucket",
        "--target",
        "target-bucket",
        "--max-requests",
        "100",
    ];

    // s3bulkcopy library converts the arguments to Config.
    let config = Config::try_from(parse_from_args(args).unwrap()).unwrap();

    // Create a cancellation token for the pipeline.
    // You can use this token to cancel the pipeline.
    let cancellation_token = create_pipeline_cancellation_token();
    let mut pipeline = Pipeline::new(config, cancellation_token).await;

    // You can get the progress snapshots while the pipeline is running.
    let progress_receiver = pipeline.get_progress_receiver();

    // Run the pipeline. It finishes when every object has been processed.
    pipeline.run().await;

    while let Ok(snapshot) = progress_receiver.try_recv() {
        println!("{snapshot:?}");
    }

    // If there is an error in the pipeline, you can get the errors.
    if pipeline.has_error() {
        println!("An error has occurred.\n\n");
        println!("{:?}", pipeline.get_errors_and_consume().unwrap()[0]);
    }

    if let Some(snapshot) = pipeline.get_final_snapshot() {
        println!("succeeded: {}, failed: {}", snapshot.succeeded, snapshot.failed);
    }
}
```
*/

pub use config::Config;
pub use config::args::CLIArgs;

pub mod config;
pub mod pipeline;
pub mod storage;
pub mod types;
