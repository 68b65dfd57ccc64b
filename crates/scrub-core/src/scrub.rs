//! The run loop: read entries, classify each, keep the accepted ones.

use std::path::Path;

use crate::classify::{Classifier, HttpInspector, MediaInspector};
use crate::error::ScrubError;
use crate::playlist::{PlaylistReader, PlaylistWriter};
use crate::report::{EntryReport, RunSummary};

/// Fail early with `NotFound` when the input playlist is missing.
pub fn ensure_input_exists(input: &Path) -> Result<(), ScrubError> {
    if input.is_file() {
        Ok(())
    } else {
        Err(ScrubError::NotFound {
            path: input.to_path_buf(),
        })
    }
}

/// Filter `input` into `output`, one entry at a time.
///
/// `on_entry` is called after each verdict. The output keeps the input header
/// and the accepted entries in their original order, and only appears at
/// `output` once every entry has been classified.
pub async fn scrub_playlist<H, M, F>(
    input: &Path,
    output: &Path,
    classifier: &Classifier<H, M>,
    mut on_entry: F,
) -> Result<RunSummary, ScrubError>
where
    H: HttpInspector,
    M: MediaInspector,
    F: FnMut(&EntryReport<'_>),
{
    let reader = PlaylistReader::open(input)?;
    let mut writer = PlaylistWriter::create(output, reader.header())?;
    let mut summary = RunSummary::default();

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        deep_probe = classifier.has_deep_probe(),
        "scrub started"
    );

    for entry in reader {
        let entry = entry?;
        let classification = classifier.classify(&entry.url).await;
        summary.record(&classification);
        tracing::info!(
            index = summary.total,
            url = %entry.url,
            verdict = %classification.verdict,
            stage = %classification.stage,
            reason = %classification.reason,
            "entry classified"
        );
        if classification.is_accepted() {
            writer.push(&entry)?;
        }
        on_entry(&EntryReport {
            index: summary.total,
            name: entry.display_name(),
            url: &entry.url,
            classification: &classification,
        });
    }

    writer.finish()?;
    tracing::info!(
        total = summary.total,
        accepted = summary.accepted,
        rejected = summary.rejected(),
        "scrub finished"
    );
    Ok(summary)
}
