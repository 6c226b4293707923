use std::{path::Path, sync::mpsc, time::Duration};

use anyhow::Context;
use notify::{DebouncedEvent, Watcher};

use crate::{
    driver::{self, Config},
    transcode::Stage,
};

/// Regenerates the output every time a shader source in the input directory changes. Blocks
/// until the watcher shuts down.
pub fn watch(config: &Config) -> anyhow::Result<()> {
    let (sender, receiver) = mpsc::channel();
    let debounce = Duration::from_millis(200);

    // keep the watcher alive for as long as we read from the channel
    let mut watcher =
        notify::PollWatcher::new(sender, debounce).context("could not start file watcher")?;
    watcher
        .watch(&config.input_dir, notify::RecursiveMode::NonRecursive)
        .with_context(|| format!("could not watch '{}'", config.input_dir.display()))?;

    info!(dir = %config.input_dir.display(), "watching for shader changes");

    regenerate_on_change(&receiver, || driver::run(config).map(drop));

    warn!("file watcher stopped");
    Ok(())
}

/// Runs `regenerate` once per burst of shader source events, until the channel closes. Returns
/// how many times it ran.
fn regenerate_on_change(
    receiver: &mpsc::Receiver<DebouncedEvent>,
    mut regenerate: impl FnMut() -> anyhow::Result<()>,
) -> usize {
    let mut runs = 0;

    while let Ok(event) = receiver.recv() {
        if !is_source_change(&event) {
            continue;
        }

        // sleep a bit so that editors saving several files are handled in one pass
        std::thread::sleep(Duration::from_millis(10));

        // skip all events currently in the queue, changes made during the run are picked up next
        while receiver.try_recv().is_ok() {}

        info!("shader sources changed, regenerating");
        runs += 1;
        if let Err(error) = regenerate() {
            error!("could not regenerate: {error:#}");
        }
    }

    runs
}

fn is_source_change(event: &DebouncedEvent) -> bool {
    match event {
        DebouncedEvent::Rescan
        | DebouncedEvent::Error(_, _)
        | DebouncedEvent::NoticeWrite(_)
        | DebouncedEvent::NoticeRemove(_) => false,
        DebouncedEvent::Create(path)
        | DebouncedEvent::Write(path)
        | DebouncedEvent::Chmod(path)
        | DebouncedEvent::Remove(path) => is_shader_source(path),
        DebouncedEvent::Rename(from, to) => is_shader_source(from) || is_shader_source(to),
    }
}

fn is_shader_source(path: &Path) -> bool {
    Stage::ALL
        .iter()
        .any(|stage| path.extension() == Some(stage.extension().as_ref()))
}
