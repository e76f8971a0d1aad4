//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use crate::progress::ScanProgress;
use anyhow::Context;
use anyhow::Result;
use unnest_core::ChannelSink;
use unnest_core::ExtractConfig;
use unnest_core::ExtractionWorker;
use unnest_core::resolve_scan_root;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let root = resolve_scan_root(&args.path)
        .with_context(|| format!("cannot access '{}'", args.path.display()))?;

    let config = ExtractConfig::default()
        .with_delete_after(args.delete)
        .with_allow_links(args.allow_links)
        .with_staging_root(args.staging_dir.clone())
        .with_max_passes(args.max_passes);
    tracing::debug!(root = %root.display(), ?config, "starting recursive extraction");

    let worker = ExtractionWorker::new();
    let (sink, receiver) = ChannelSink::channel();
    let handle = add_path_context(worker.start(root.clone(), config, sink), &root)?;

    // Use a spinner if TTY is detected and the formatter streams to it
    let mut progress = (formatter.shows_progress() && ScanProgress::should_show())
        .then(ScanProgress::new);

    // The channel closes when the worker thread drops its sink
    let mut events = Vec::new();
    for event in receiver {
        match progress.as_mut() {
            Some(progress) => {
                progress.observe(&event);
                progress.suspend(|| formatter.format_event(&event));
            }
            None => formatter.format_event(&event),
        }
        events.push(event);
    }
    drop(progress);

    let report = add_path_context(handle.join(), &root)?;
    formatter.format_scan_result(&report, &events)?;

    Ok(())
}
