//! Batch runners for the `resolve` and `outlines` commands.
//!
//! Entities are processed concurrently up to
//! `AppConfig::max_concurrent_entities`. Per-entity failures are written to
//! the output and counted rather than propagated, so one bad record does
//! not abort the run.

use std::collections::HashSet;
use std::path::Path;

use futures::stream::{self, StreamExt};
use locus_core::{AppConfig, CandidateEntity, MatchMethod, OutlineSet, OutlineSource, Resolution};
use locus_places::{PlacesClient, PlacesClientConfig};
use locus_resolver::{ResolveOptions, Resolver};
use serde::Serialize;
use uuid::Uuid;

use crate::sink::JsonLinesSink;

/// Per-outcome counts for a resolve run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolveTotals {
    pub autocomplete: usize,
    pub text_search: usize,
    pub unresolved: usize,
    pub failed: usize,
}

impl ResolveTotals {
    pub(crate) fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Resolved(location) => match location.match_method {
                MatchMethod::Autocomplete => self.autocomplete += 1,
                MatchMethod::TextSearch => self.text_search += 1,
            },
            Resolution::Unresolved { .. } => self.unresolved += 1,
            Resolution::Failed { .. } => self.failed += 1,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.autocomplete + self.text_search + self.unresolved + self.failed
    }
}

/// Per-outcome counts for an outlines run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OutlineTotals {
    pub with_outlines: usize,
    pub without_outlines: usize,
    pub failed: usize,
}

impl OutlineTotals {
    pub(crate) fn total(&self) -> usize {
        self.with_outlines + self.without_outlines + self.failed
    }
}

/// One outlines-mode output line.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum OutlinesOutcome {
    Completed(OutlineSet),
    Failed { entity_id: i64, error: String },
}

/// Restricts `all` to `ids`, preserving file order. An empty `ids` keeps
/// every candidate.
///
/// # Errors
///
/// Returns an error naming the first requested id absent from the file.
pub(crate) fn select_candidates(
    all: Vec<CandidateEntity>,
    ids: &[i64],
) -> anyhow::Result<Vec<CandidateEntity>> {
    if ids.is_empty() {
        return Ok(all);
    }
    let known: HashSet<i64> = all.iter().map(|c| c.id).collect();
    if let Some(missing) = ids.iter().find(|id| !known.contains(*id)) {
        anyhow::bail!("candidate {missing} not found in candidates file");
    }
    let wanted: HashSet<i64> = ids.iter().copied().collect();
    Ok(all.into_iter().filter(|c| wanted.contains(&c.id)).collect())
}

fn load_selection(path: &Path, ids: &[i64]) -> anyhow::Result<Vec<CandidateEntity>> {
    let all = locus_core::load_candidates(path)?;
    select_candidates(all, ids)
}

fn print_dry_run(command: &str, candidates: &[CandidateEntity]) {
    let ids: Vec<String> = candidates.iter().map(|c| c.id.to_string()).collect();
    println!(
        "dry-run: would {command} {} entities: [{}]",
        candidates.len(),
        ids.join(", ")
    );
}

fn build_client(config: &AppConfig) -> anyhow::Result<PlacesClient> {
    PlacesClient::new(PlacesClientConfig::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build places client: {e}"))
}

/// Resolves every selected candidate and writes one line per entity.
///
/// # Errors
///
/// Returns an error if the candidates file cannot be loaded, an id filter
/// does not match, the client or output cannot be set up, or every entity
/// failed.
pub(crate) async fn run_resolve(
    config: &AppConfig,
    candidates_path: &Path,
    ids: &[i64],
    no_autocomplete: bool,
    output: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let candidates = load_selection(candidates_path, ids)?;

    if dry_run {
        print_dry_run("resolve", &candidates);
        return Ok(());
    }

    let mut options = ResolveOptions::from_app_config(config);
    if no_autocomplete {
        options.autocomplete_enabled = false;
    }
    let resolver = Resolver::new(build_client(config)?, options);

    let run_id = Uuid::new_v4();
    tracing::info!(
        %run_id,
        entities = candidates.len(),
        autocomplete = options.autocomplete_enabled,
        "starting resolve run"
    );

    let mut sink = JsonLinesSink::open(output, run_id)?;
    let mut totals = ResolveTotals::default();
    let max_concurrent = config.max_concurrent_entities.max(1);

    let mut results = stream::iter(&candidates)
        .map(|entity| resolver.resolve(entity))
        .buffer_unordered(max_concurrent);
    while let Some(resolution) = results.next().await {
        totals.record(&resolution);
        sink.write(&resolution)?;
    }
    sink.finish()?;

    tracing::info!(
        %run_id,
        autocomplete = totals.autocomplete,
        text_search = totals.text_search,
        unresolved = totals.unresolved,
        failed = totals.failed,
        "resolve run finished"
    );
    eprintln!(
        "resolved {} via autocomplete, {} via text search; {} unresolved, {} failed",
        totals.autocomplete, totals.text_search, totals.unresolved, totals.failed
    );

    if totals.total() > 0 && totals.failed == totals.total() {
        anyhow::bail!("all {} entities failed resolution", totals.failed);
    }
    Ok(())
}

/// Looks up building outlines for every selected candidate.
///
/// # Errors
///
/// Same setup errors as [`run_resolve`], or every entity failed.
pub(crate) async fn run_outlines(
    config: &AppConfig,
    candidates_path: &Path,
    ids: &[i64],
    source: OutlineSource,
    output: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let candidates = load_selection(candidates_path, ids)?;

    if dry_run {
        print_dry_run("fetch outlines for", &candidates);
        return Ok(());
    }

    let resolver = Resolver::new(build_client(config)?, ResolveOptions::from_app_config(config));

    let run_id = Uuid::new_v4();
    tracing::info!(
        %run_id,
        entities = candidates.len(),
        ?source,
        "starting outlines run"
    );

    let mut sink = JsonLinesSink::open(output, run_id)?;
    let mut totals = OutlineTotals::default();
    let max_concurrent = config.max_concurrent_entities.max(1);

    let mut results = stream::iter(&candidates)
        .map(|entity| {
            let resolver = &resolver;
            async move { (entity.id, resolver.outlines_only(entity, source).await) }
        })
        .buffer_unordered(max_concurrent);
    while let Some((entity_id, result)) = results.next().await {
        let outcome = match result {
            Ok(set) => {
                if set.outlines.is_empty() {
                    totals.without_outlines += 1;
                } else {
                    totals.with_outlines += 1;
                }
                OutlinesOutcome::Completed(set)
            }
            Err(err) => {
                tracing::error!(entity_id, error = %err, "outline lookup failed");
                totals.failed += 1;
                OutlinesOutcome::Failed {
                    entity_id,
                    error: err.to_string(),
                }
            }
        };
        sink.write(&outcome)?;
    }
    sink.finish()?;

    tracing::info!(
        %run_id,
        with_outlines = totals.with_outlines,
        without_outlines = totals.without_outlines,
        failed = totals.failed,
        "outlines run finished"
    );
    eprintln!(
        "{} entities with outlines, {} without; {} failed",
        totals.with_outlines, totals.without_outlines, totals.failed
    );

    if totals.total() > 0 && totals.failed == totals.total() {
        anyhow::bail!("all {} entities failed outline lookup", totals.failed);
    }
    Ok(())
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
