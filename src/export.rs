use crate::archive::{Document, write_archive};
use crate::diagnostics::Diagnostics;
use crate::formatter::Formatter;
use crate::source::ConversationSource;
use crate::utils::{ExportConfig, ExportSummary, short_id};
use crossbeam_channel::{SendTimeoutError, bounded, unbounded};
use eyre::{Context, Report, Result, eyre};
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

const UNTITLED: &str = "untitled";

struct Formatted {
    index: usize,
    document: Document,
}

/// Fetch, format and archive every requested conversation.
///
/// Any fetch failure aborts the whole batch before the archive file is created.
pub fn execute(
    config: &ExportConfig,
    source: &dyn ConversationSource,
    diagnostics: &dyn Diagnostics,
) -> Result<ExportSummary> {
    let ids = resolve_ids(config, source)?;
    if ids.is_empty() {
        return Err(eyre!("No conversations found"));
    }

    let documents = format_all(config, &ids, source, diagnostics)?;
    let empty = documents.iter().filter(|d| d.body.is_empty()).count();

    let entries = write_archive(&config.output, &documents)
        .wrap_err_with(|| format!("Failed to write archive: {}", config.output.display()))?;
    log::debug!(
        "Archived {} entries to {}",
        entries.len(),
        config.output.display()
    );

    Ok(ExportSummary {
        archive: config.output.clone(),
        exported: entries.len(),
        empty,
        entries,
    })
}

fn resolve_ids(config: &ExportConfig, source: &dyn ConversationSource) -> Result<Vec<String>> {
    if config.ids.is_empty() {
        source.ids().wrap_err("Failed to list conversations")
    } else {
        Ok(config.ids.clone())
    }
}

// ── Worker pool ───────────────────────────────────────────────────────────────

fn format_all(
    config: &ExportConfig,
    ids: &[String],
    source: &dyn ConversationSource,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<Document>> {
    let (tx, rx) = bounded::<(usize, String)>(64);
    let (done_tx, done_rx) = unbounded::<Formatted>();
    let count_fetched = AtomicUsize::new(0);
    let should_stop = AtomicBool::new(false);
    let first_error: Mutex<Option<Report>> = Mutex::new(None);
    let n_workers = config.workers.clamp(1, ids.len());

    std::thread::scope(|s| {
        for _ in 0..n_workers {
            let rx = rx.clone();
            let done_tx = done_tx.clone();
            let (count_fetched, should_stop, first_error) =
                (&count_fetched, &should_stop, &first_error);

            s.spawn(move || {
                let formatter = Formatter::with_options(diagnostics, config.format);

                while let Ok((index, id)) = rx.recv() {
                    if should_stop.load(Ordering::Relaxed) {
                        break;
                    }

                    let value = match source.fetch(&id) {
                        Ok(v) => v,
                        Err(e) => {
                            should_stop.store(true, Ordering::Relaxed);
                            let mut slot = match first_error.lock() {
                                Ok(guard) => guard,
                                Err(poisoned) => poisoned.into_inner(),
                            };
                            if slot.is_none() {
                                *slot = Some(e.wrap_err(format!(
                                    "Failed to fetch conversation [{}]",
                                    short_id(&id)
                                )));
                            }
                            break;
                        }
                    };
                    count_fetched.fetch_add(1, Ordering::Relaxed);
                    log::debug!("Fetched [{}]", short_id(&id));

                    let body = formatter.format(&value);
                    let document = Document {
                        title: entry_title(&value),
                        body,
                    };
                    if done_tx.send(Formatted { index, document }).is_err() {
                        break;
                    }
                }
            });
        }

        drop(rx);
        drop(done_tx);

        'outer: for (index, id) in ids.iter().enumerate() {
            if should_stop.load(Ordering::Relaxed) {
                break;
            }
            let mut pending = (index, id.clone());
            loop {
                match tx.send_timeout(pending, Duration::from_millis(50)) {
                    Ok(()) => break,
                    Err(SendTimeoutError::Disconnected(_)) => break 'outer,
                    Err(SendTimeoutError::Timeout(r)) => {
                        pending = r;
                        if should_stop.load(Ordering::Relaxed) {
                            break 'outer;
                        }
                    }
                }
            }
        }

        drop(tx);
    });

    let first_error = match first_error.into_inner() {
        Ok(e) => e,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(e) = first_error {
        return Err(e);
    }

    let mut finished: Vec<Formatted> = done_rx.iter().collect();
    if finished.len() != ids.len() {
        return Err(eyre!(
            "Export incomplete: {} of {} conversations formatted ({} fetched)",
            finished.len(),
            ids.len(),
            count_fetched.load(Ordering::Relaxed)
        ));
    }
    finished.sort_by_key(|f| f.index);
    Ok(finished.into_iter().map(|f| f.document).collect())
}

/// Title used to name the archive entry; the record's own, unaltered.
fn entry_title(value: &Value) -> String {
    value
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string()
}
