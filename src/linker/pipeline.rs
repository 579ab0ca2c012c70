use std::fmt;
use std::path::Path;

use crate::config::LinkerConfig;
use crate::errors::LinkerError;
use crate::linker::mutator::plan_links;
use crate::linker::ranker::{EmbeddedNote, SimilarityMatrix};
use crate::llm::EmbeddingProvider;
use crate::pace::Pacer;
use crate::vault::{self, NoteRecord};

/// Pipeline stages, visited in order and never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkerState {
    Scanning,
    Embedding,
    Linking,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub notes_found: usize,
    pub unreadable: usize,
    pub embedded: usize,
    pub embedding_failures: usize,
    pub notes_updated: usize,
    pub links_added: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// No markdown file could be read
    NoNotes,
    /// Every embedding request failed
    NoEmbeddings { attempted: usize },
    Completed(LinkReport),
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOutcome::NoNotes => {
                write!(f, "No notes found. Please check the vault path.")
            }
            LinkOutcome::NoEmbeddings { attempted } => {
                write!(f, "No embeddings generated for {attempted} notes. Exiting.")
            }
            LinkOutcome::Completed(report) => {
                write!(
                    f,
                    "Completed! Added {} links across {} notes.",
                    report.links_added, report.notes_updated
                )?;
                if report.embedding_failures > 0 {
                    write!(
                        f,
                        " {} of {} notes were skipped because embedding failed.",
                        report.embedding_failures, report.notes_found
                    )?;
                }
                if report.unreadable > 0 {
                    write!(f, " {} files could not be read.", report.unreadable)?;
                }
                Ok(())
            }
        }
    }
}

/// Scans a vault, embeds every note and links each one to its most similar peers.
pub struct LinkerPipeline<'a, P: EmbeddingProvider> {
    provider: &'a P,
    config: LinkerConfig,
    embed_pacer: Pacer,
    write_pacer: Pacer,
    state: LinkerState,
}

impl<'a, P: EmbeddingProvider> LinkerPipeline<'a, P> {
    pub fn new(provider: &'a P, config: LinkerConfig) -> Self {
        Self {
            provider,
            embed_pacer: Pacer::new(config.embed_pause),
            write_pacer: Pacer::new(config.write_pause),
            config,
            state: LinkerState::Scanning,
        }
    }

    pub fn state(&self) -> LinkerState {
        self.state
    }

    fn enter(&mut self, state: LinkerState) {
        log::debug!("linker: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub fn run(&mut self, vault_path: &Path) -> Result<LinkOutcome, LinkerError> {
        let _span = tracing::info_span!("linker", vault = %vault_path.display()).entered();

        self.enter(LinkerState::Scanning);
        log::info!("Scanning vault at: {}", vault_path.display());
        let scan = vault::scan_vault(vault_path);
        if scan.notes.is_empty() {
            self.enter(LinkerState::Done);
            return Ok(LinkOutcome::NoNotes);
        }

        let mut report = LinkReport {
            notes_found: scan.notes.len(),
            unreadable: scan.unreadable,
            ..Default::default()
        };

        self.enter(LinkerState::Embedding);
        let embedded = match self.embed_all(&scan.notes) {
            Ok(embedded) => embedded,
            Err(err) => {
                self.enter(LinkerState::Done);
                return Err(err);
            }
        };
        report.embedded = embedded.len();
        report.embedding_failures = report.notes_found - embedded.len();

        if embedded.is_empty() {
            self.enter(LinkerState::Done);
            return Ok(LinkOutcome::NoEmbeddings {
                attempted: report.notes_found,
            });
        }
        if report.embedding_failures > 0 {
            log::warn!(
                "{} of {} notes have no embedding and will not be linked",
                report.embedding_failures,
                report.notes_found
            );
        }

        self.enter(LinkerState::Linking);
        self.link_all(&embedded, &mut report);

        self.enter(LinkerState::Done);
        Ok(LinkOutcome::Completed(report))
    }

    /// Embed every note in discovery order, one request at a time.
    ///
    /// Notes whose request fails are dropped. All successful vectors must share
    /// the dimension of the first one.
    fn embed_all(&self, notes: &[NoteRecord]) -> Result<Vec<EmbeddedNote>, LinkerError> {
        log::info!("Generating embeddings for {} notes...", notes.len());

        let mut embedded: Vec<EmbeddedNote> = Vec::with_capacity(notes.len());
        let mut mismatch: Option<LinkerError> = None;

        for note in notes {
            let vector = self.provider.embed(&note.content);
            self.embed_pacer.pause();

            let Some(vector) = vector else {
                log::warn!("no embedding for {}, skipping", note.path.display());
                continue;
            };

            if let Some(first) = embedded.first() {
                if first.vector.len() != vector.len() && mismatch.is_none() {
                    mismatch = Some(LinkerError::DimensionMismatch {
                        path: note.path.clone(),
                        expected: first.vector.len(),
                        got: vector.len(),
                    });
                }
            }

            embedded.push(EmbeddedNote {
                title: note.title.clone(),
                path: note.path.clone(),
                vector,
            });
        }

        match mismatch {
            Some(err) => Err(err),
            None => Ok(embedded),
        }
    }

    fn link_all(&self, notes: &[EmbeddedNote], report: &mut LinkReport) {
        let matrix = SimilarityMatrix::compute(notes);
        log::debug!("computed {n}x{n} similarity matrix", n = matrix.size());

        for (i, source) in notes.iter().enumerate() {
            let matches = matrix.rank(i, self.config.similarity_threshold, self.config.top_k);
            if matches.is_empty() {
                continue;
            }

            log::info!("Found related notes for '{}':", source.title);

            let current = match vault::read_note(&source.path) {
                Ok(content) => content,
                Err(err) => {
                    log::warn!("Could not re-read {}: {err}", source.path.display());
                    continue;
                }
            };

            let candidates: Vec<(&str, f32)> = matches
                .iter()
                .map(|m| (notes[m.target].title.as_str(), m.score))
                .collect();

            let Some(update) = plan_links(&current, &candidates) else {
                continue;
            };

            if let Err(err) = vault::write_note(&source.path, &update.content) {
                log::warn!("Could not write {}: {err}", source.path.display());
                continue;
            }

            log::info!("Updated: {}", source.path.display());
            report.notes_updated += 1;
            report.links_added += update.added.len();
            self.write_pacer.pause();
        }
    }
}
