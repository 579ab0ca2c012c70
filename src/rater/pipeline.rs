use std::fmt;
use std::path::Path;

use crate::llm::TextGenerator;
use crate::rater::frontmatter::{self, RatingMerge};
use crate::rater::prompt::{parse_rating, rating_prompt};
use crate::vault::{self, NoteRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateReport {
    pub notes_found: usize,
    pub unreadable: usize,
    pub rated: usize,
    pub already_rated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateOutcome {
    NoNotes,
    Completed(RateReport),
}

impl fmt::Display for RateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateOutcome::NoNotes => write!(f, "No notes found. Please check the vault path."),
            RateOutcome::Completed(report) => write!(
                f,
                "Completed! Rated {} of {} notes ({} already rated, {} failed, {} unreadable).",
                report.rated,
                report.notes_found,
                report.already_rated,
                report.failed,
                report.unreadable
            ),
        }
    }
}

enum NoteResult {
    Rated,
    AlreadyRated,
    Failed,
}

/// Asks the generation model to rate each note and stores the answer in the
/// note's frontmatter.
pub struct RatePipeline<'a, G: TextGenerator> {
    generator: &'a G,
}

impl<'a, G: TextGenerator> RatePipeline<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }

    pub fn run(&self, vault_path: &Path) -> RateOutcome {
        let _span = tracing::info_span!("rater", vault = %vault_path.display()).entered();

        log::info!("Scanning vault at: {}", vault_path.display());
        let scan = vault::scan_vault(vault_path);
        if scan.notes.is_empty() {
            return RateOutcome::NoNotes;
        }

        let mut report = RateReport {
            notes_found: scan.notes.len(),
            unreadable: scan.unreadable,
            ..Default::default()
        };

        for note in &scan.notes {
            match self.rate_note(note) {
                NoteResult::Rated => report.rated += 1,
                NoteResult::AlreadyRated => report.already_rated += 1,
                NoteResult::Failed => report.failed += 1,
            }
        }

        RateOutcome::Completed(report)
    }

    fn rate_note(&self, note: &NoteRecord) -> NoteResult {
        log::info!("Processing note: {}", note.path.display());

        match frontmatter::has_rating(&note.content) {
            Ok(true) => {
                log::info!("  > Note already has a rating in the frontmatter. Skipping.");
                return NoteResult::AlreadyRated;
            }
            Ok(false) => {}
            Err(err) => {
                log::warn!("  > Unusable frontmatter in {}: {err}", note.path.display());
                return NoteResult::Failed;
            }
        }

        let Some(response) = self
            .generator
            .generate(&rating_prompt(&note.content), None, true)
        else {
            log::warn!("  > Failed to get rating for {}, skipping.", note.title);
            return NoteResult::Failed;
        };

        let rating = match parse_rating(&response) {
            Ok(rating) => rating,
            Err(err) => {
                log::warn!("  > Could not parse rating for {}: {err}", note.title);
                return NoteResult::Failed;
            }
        };
        log::info!(
            "  > Received rating: {} and feedback: {}",
            rating.rating,
            rating.feedback
        );

        let current = match vault::read_note(&note.path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("  > Could not re-read {}: {err}", note.path.display());
                return NoteResult::Failed;
            }
        };

        match frontmatter::apply_rating(&current, &rating) {
            Ok(RatingMerge::Updated(updated)) => {
                if let Err(err) = vault::write_note(&note.path, &updated) {
                    log::warn!("  > Could not write {}: {err}", note.path.display());
                    return NoteResult::Failed;
                }
                log::info!("  > Added rating to {}", note.title);
                NoteResult::Rated
            }
            Ok(RatingMerge::AlreadyRated) => NoteResult::AlreadyRated,
            Err(err) => {
                log::warn!("  > Unusable frontmatter in {}: {err}", note.path.display());
                NoteResult::Failed
            }
        }
    }
}
