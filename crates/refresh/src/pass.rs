#![forbid(unsafe_code)]

use crate::time::now_rfc3339;
use std::io::Write;
use tally_storage::ProviderRegistry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PassSummary {
    pub(crate) providers: usize,
    pub(crate) refreshed: usize,
    pub(crate) failed: usize,
}

/// Drains every provider once, writing one line per refreshed counter.
///
/// Counters are dropped as soon as their line is written; a long pass never
/// holds more than one at a time. Per-counter failures are logged and skipped.
pub(crate) fn run_pass(
    registry: &ProviderRegistry<'_>,
    out: &mut impl Write,
) -> std::io::Result<PassSummary> {
    let mut summary = PassSummary::default();

    for provider in registry.iter() {
        summary.providers += 1;
        for item in provider.counters() {
            match item {
                Ok(counter) => {
                    writeln!(
                        out,
                        "{} -> {} at {}",
                        counter.name,
                        counter.value,
                        now_rfc3339()
                    )?;
                    summary.refreshed += 1;
                }
                Err(err) => {
                    tracing::error!(provider = provider.name(), error = %err, "counter refresh failed");
                    summary.failed += 1;
                }
            }
        }
    }

    out.flush()?;
    Ok(summary)
}
