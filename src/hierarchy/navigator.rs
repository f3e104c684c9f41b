use crate::error::{InspectorError, Result};

/// Cyclic cursor over the flat element index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    current: Option<usize>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently focused index, `None` until something is selected
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Move forward, starting at 0 and wrapping past the last element
    pub fn next(&mut self, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(InspectorError::EmptyIndex);
        }

        let index = match self.current {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.current = Some(index);
        Ok(index)
    }

    /// Move backward, starting at the last element and wrapping below 0
    pub fn previous(&mut self, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(InspectorError::EmptyIndex);
        }

        let index = match self.current {
            Some(i) if i > 0 => (i - 1).min(len - 1),
            _ => len - 1,
        };
        self.current = Some(index);
        Ok(index)
    }

    /// Focus a specific element
    pub fn select(&mut self, index: usize, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(InspectorError::EmptyIndex);
        }
        if index >= len {
            return Err(InspectorError::ElementNotFound(format!(
                "index {} is out of range (0..{})",
                index, len
            )));
        }
        self.current = Some(index);
        Ok(index)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
