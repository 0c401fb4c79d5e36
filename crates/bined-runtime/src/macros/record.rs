#![forbid(unsafe_code)]

/// A named, ordered list of encoded macro steps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct MacroRecord {
    pub name: String,
    pub steps: Vec<String>,
}

impl MacroRecord {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_steps(name: impl Into<String>, steps: Vec<String>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn add_step(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    /// Replace the step at `index`; out of range indices are ignored.
    pub fn set_step(&mut self, index: usize, step: impl Into<String>) {
        if let Some(slot) = self.steps.get_mut(index) {
            *slot = step.into();
        }
    }

    #[must_use]
    pub fn last_step(&self) -> Option<&str> {
        self.steps.last().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
