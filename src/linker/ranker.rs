//! Pairwise cosine similarity and per-note candidate ranking.

use std::cmp::Ordering;
use std::path::PathBuf;

/// A note whose content was embedded successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedNote {
    pub title: String,
    pub path: PathBuf,
    pub vector: Vec<f32>,
}

/// A candidate link target for some source note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityMatch {
    /// Index of the target in the ranked note list
    pub target: usize,
    /// Cosine similarity in [-1.0, 1.0]
    pub score: f32,
}

/// Compute L2 norm of a vector.
fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity between two vectors.
/// Zero-magnitude input yields 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (a_norm, b_norm) = (l2_norm(a), l2_norm(b));
    if a_norm < f32::EPSILON || b_norm < f32::EPSILON {
        return 0.0;
    }
    (dot(a, b) / (a_norm * b_norm)).clamp(-1.0, 1.0)
}

/// Symmetric N×N similarity matrix, computed once per run.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    pub fn compute(notes: &[EmbeddedNote]) -> Self {
        let size = notes.len();
        let mut scores = vec![0.0; size * size];

        for i in 0..size {
            for j in i..size {
                let score = cosine_similarity(&notes[i].vector, &notes[j].vector);
                scores[i * size + j] = score;
                scores[j * size + i] = score;
            }
        }

        Self { size, scores }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.scores[i * self.size + j]
    }

    /// Best matches for `source`: every other note with a score strictly
    /// above `threshold`, highest first, at most `top_k` of them.
    ///
    /// The sort is stable, so equal scores keep discovery order.
    pub fn rank(&self, source: usize, threshold: f32, top_k: usize) -> Vec<SimilarityMatch> {
        let mut matches: Vec<SimilarityMatch> = (0..self.size)
            .filter(|&j| j != source)
            .map(|j| SimilarityMatch {
                target: j,
                score: self.get(source, j),
            })
            .filter(|m| m.score > threshold)
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(top_k);

        matches
    }
}
