
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use crate::llm::{EmbeddingProvider, TextGenerator};

/// Embedding provider answering from a fixed content -> vector table.
/// Content missing from the table fails.
#[derive(Default)]
pub struct StubProvider {
    vectors: HashMap<String, Vec<f32>>,
    pub calls: RefCell<Vec<String>>,
}

impl StubProvider {
    pub fn with(mut self, content: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(content.to_string(), vector);
        self
    }
}

impl EmbeddingProvider for StubProvider {
    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        self.calls.borrow_mut().push(text.to_string());
        self.vectors.get(text).cloned()
    }
}

/// Text generator returning the same answer for every prompt.
pub struct StubGenerator {
    response: Option<String>,
    pub prompts: RefCell<Vec<String>>,
}

impl StubGenerator {
    pub fn answering(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl TextGenerator for StubGenerator {
    fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        json_mode: bool,
    ) -> Option<String> {
        assert!(json_mode, "ratings are always requested in json mode");
        self.prompts.borrow_mut().push(prompt.to_string());
        self.response.clone()
    }
}

pub fn write_note(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub fn read_note(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative)).unwrap()
}
