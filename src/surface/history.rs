use crate::surface::model::{CanvasModel, Stroke};

pub const DEFAULT_MAX_UNDO: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    Stroke(Stroke),
    /// Holds the strokes that were on the canvas before the clear.
    Clear(Vec<Stroke>),
}

/// Canvas contents plus bounded undo/redo. Strokes and clears are both undoable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawHistory {
    canvas: CanvasModel,
    undo_stack: Vec<Edit>,
    redo_stack: Vec<Edit>,
    max_depth: usize,
}

impl Default for DrawHistory {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_UNDO)
    }
}

impl DrawHistory {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            canvas: CanvasModel::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    pub fn commit(&mut self, stroke: Stroke) {
        self.canvas.strokes.push(stroke.clone());
        self.push_undo(Edit::Stroke(stroke));
        self.redo_stack.clear();
    }

    /// Returns `false` when the canvas was already empty.
    pub fn clear(&mut self) -> bool {
        if self.canvas.is_empty() {
            return false;
        }
        let removed = std::mem::take(&mut self.canvas.strokes);
        self.push_undo(Edit::Clear(removed));
        self.redo_stack.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(edit) = self.undo_stack.pop() else {
            return false;
        };
        match &edit {
            Edit::Stroke(_) => {
                self.canvas.strokes.pop();
            }
            Edit::Clear(removed) => {
                self.canvas.strokes = removed.clone();
            }
        }
        self.redo_stack.push(edit);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(edit) = self.redo_stack.pop() else {
            return false;
        };
        match &edit {
            Edit::Stroke(stroke) => self.canvas.strokes.push(stroke.clone()),
            Edit::Clear(_) => self.canvas.strokes.clear(),
        }
        self.undo_stack.push(edit);
        true
    }

    fn push_undo(&mut self, edit: Edit) {
        self.undo_stack.push(edit);
        if self.undo_stack.len() > self.max_depth {
            let overflow = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(..overflow);
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn canvas(&self) -> &CanvasModel {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::model::StrokeStyle;

    fn sample_stroke(id: i32) -> Stroke {
        Stroke {
            style: StrokeStyle::default(),
            points: vec![(id, id), (id + 5, id + 5)],
        }
    }

    #[test]
    fn new_commit_clears_redo_stack() {
        let mut history = DrawHistory::default();
        history.commit(sample_stroke(0));
        assert!(history.undo());
        assert_eq!(history.redo_len(), 1);

        history.commit(sample_stroke(1));
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.canvas().strokes, vec![sample_stroke(1)]);
    }

    #[test]
    fn undo_redo_walks_strokes_in_order() {
        let mut history = DrawHistory::default();
        history.commit(sample_stroke(1));
        history.commit(sample_stroke(2));

        assert!(history.undo());
        assert_eq!(history.canvas().strokes, vec![sample_stroke(1)]);
        assert!(history.undo());
        assert!(history.canvas().is_empty());
        assert!(!history.undo());

        assert!(history.redo());
        assert!(history.redo());
        assert!(!history.redo());
        assert_eq!(
            history.canvas().strokes,
            vec![sample_stroke(1), sample_stroke(2)]
        );
    }

    #[test]
    fn clear_is_undoable() {
        let mut history = DrawHistory::default();
        history.commit(sample_stroke(1));
        history.commit(sample_stroke(2));
        assert!(history.clear());
        assert!(history.canvas().is_empty());

        assert!(history.undo());
        assert_eq!(history.canvas().strokes.len(), 2);
        assert!(history.redo());
        assert!(history.canvas().is_empty());
    }

    #[test]
    fn clearing_an_empty_canvas_records_nothing() {
        let mut history = DrawHistory::default();
        assert!(!history.clear());
        assert_eq!(history.undo_len(), 0);
    }

    #[test]
    fn depth_is_bounded_and_oldest_edits_become_permanent() {
        let mut history = DrawHistory::with_max_depth(3);
        for id in 0..5 {
            history.commit(sample_stroke(id));
        }
        assert_eq!(history.undo_len(), 3);
        while history.undo() {}
        assert_eq!(
            history.canvas().strokes,
            vec![sample_stroke(0), sample_stroke(1)]
        );
    }
}
