use crate::cli::PredictArgs;
use crate::predictor::{
    InstallDir, KmerGraph, Params, ReportWriter, SamplePredictor, SampleReport,
};
use crate::utils::{create_writer, sample_name_from_path, Result};
use crossbeam_channel::{bounded, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    thread::{self},
};

const CHANNEL_BUFFER_SIZE: usize = 64;

#[derive(Debug, Clone)]
struct Sample {
    name: String,
    coverage_path: PathBuf,
}

pub fn predict(args: PredictArgs) -> Result<()> {
    if args.sample_name.is_some() && args.coverage_paths.len() > 1 {
        return Err("--sample-name can only be used with a single coverage table".into());
    }

    let install = InstallDir::new(&args.install_dir);
    install.check()?;
    log::debug!("Install directory {} is complete", install.root().display());

    let writer = create_writer(args.output_path.as_deref())?;
    let mut report_writer = ReportWriter::new(writer, args.format)?;

    let params = Params {
        ignore_first: args.ignore_first,
        ignore_last: args.ignore_last,
        expected_depth: args.expected_depth,
        min_percent_covered: args.min_percent_covered,
        min_reads: args.min_reads,
        minor_fraction: args.minor_fraction,
        min_kmer_count: args.min_kmer_count,
    };

    let (sender_sample, receiver_sample) = bounded(CHANNEL_BUFFER_SIZE);
    let coverage_paths = args.coverage_paths;
    let sample_name = args.sample_name;
    let sample_stream_thread = thread::spawn(move || {
        stream_samples_into_channel(coverage_paths, sample_name, sender_sample)
    });

    let (sender_result, receiver_result) = bounded::<SampleReport>(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || -> Result<()> {
        for report in &receiver_result {
            report_writer.write(&report)?;
        }
        report_writer.finish()
    });

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let failed_samples = AtomicUsize::new(0);
    let pool = initialize_thread_pool(args.num_threads)?;
    pool.install(|| {
        receiver_sample.into_iter().par_bridge().for_each_init(
            || {
                (
                    SamplePredictor::new(&install, params.clone()),
                    sender_result.clone(),
                )
            },
            |(predictor, s), sample_result| {
                let outcome =
                    sample_result.and_then(|sample| process_sample(&sample, predictor, s));
                if let Err(err) = outcome {
                    log::error!("Sample processing: {}", err);
                    failed_samples.fetch_add(1, Ordering::Relaxed);
                }
            },
        );
    });

    // Clean-up
    drop(sender_result);
    writer_thread.join().expect("Writer thread panicked")?;
    log::trace!("Writer thread finished");
    sample_stream_thread
        .join()
        .expect("Sample stream thread panicked");
    log::trace!("Sample stream thread finished");

    match failed_samples.into_inner() {
        0 => Ok(()),
        n => Err(format!("Prediction failed for {} sample(s)", n)),
    }
}

fn stream_samples_into_channel(
    coverage_paths: Vec<PathBuf>,
    sample_name: Option<String>,
    sender: Sender<Result<Sample>>,
) {
    for coverage_path in coverage_paths {
        let name = match &sample_name {
            Some(name) => Ok(name.clone()),
            None => sample_name_from_path(&coverage_path),
        };
        let sample = name.map(|name| Sample {
            name,
            coverage_path,
        });
        if sender.send(sample).is_err() {
            log::error!("Failed to send sample to channel");
            break;
        }
    }
}

fn process_sample(
    sample: &Sample,
    predictor: &mut SamplePredictor,
    sender: &Sender<SampleReport>,
) -> Result<()> {
    log::debug!(
        "{}: loading coverage from {}",
        sample.name,
        sample.coverage_path.display()
    );
    let graph = KmerGraph::from_path(&sample.coverage_path)?;
    let expected_depth = resolve_expected_depth(predictor.params(), &graph);
    log::info!(
        "{}: {} distinct {}-mers, expected depth {}",
        sample.name,
        graph.len(),
        graph.kmer_size(),
        expected_depth
    );

    let report = predictor.predict(&sample.name, &graph, expected_depth)?;
    sender
        .send(report)
        .map_err(|e| format!("Failed to send report for {}: {}", sample.name, e))
}

fn resolve_expected_depth(params: &Params, graph: &KmerGraph) -> u32 {
    params
        .expected_depth
        .or_else(|| graph.estimate_depth(params.min_kmer_count))
        .unwrap_or_else(|| {
            log::warn!("No k-mer reaches the minimum count, expected depth unknown");
            0
        })
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("resistotype-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
