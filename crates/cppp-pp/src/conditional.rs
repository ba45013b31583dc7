//! Conditional-inclusion stack for `#if`/`#ifdef`/`#ifndef`/`#elif`/`#else`/
//! `#endif` (spec §4.7).
//!
//! Invariant maintained throughout: a frame's state is only ever set to
//! `Taking` while [`ConditionalStack::is_active`] was true for its parent,
//! so checking just the top frame tells you whether the whole stack is
//! currently emitting — no need to walk every ancestor on every token.

use cppp_util::Span;

use crate::error::DirectiveError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// This branch is active: tokens are emitted, nested directives run.
    Taking,
    /// Not currently emitting, but a later `#elif`/`#else` in this same
    /// group could still become `Taking`.
    Skipping,
    /// No branch in this group will ever take again — either one already
    /// did, or the group is nested inside a skipped/done region.
    Done,
}

struct Frame {
    state: FrameState,
    has_else: bool,
    opened_by_span: Span,
}

pub struct ConditionalStack {
    frames: Vec<Frame>,
    max_depth: usize,
}

impl ConditionalStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Whether tokens should currently be emitted / further directives
    /// processed for real.
    pub fn is_active(&self) -> bool {
        match self.frames.last() {
            None => true,
            Some(f) => f.state == FrameState::Taking,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// `#if`/`#ifdef`/`#ifndef`. `cond` is ignored (and should not have been
    /// evaluated by the caller) when the stack is already inactive.
    pub fn push_if(&mut self, cond: bool, span: Span) -> Result<(), DirectiveError> {
        let parent_active = self.is_active();
        let state = if !parent_active {
            FrameState::Done
        } else if cond {
            FrameState::Taking
        } else {
            FrameState::Skipping
        };
        let exceeded = self.frames.len() >= self.max_depth;
        self.frames.push(Frame {
            state: if exceeded { FrameState::Done } else { state },
            has_else: false,
            opened_by_span: span,
        });
        if exceeded {
            return Err(DirectiveError::ConditionalDepthExceeded);
        }
        Ok(())
    }

    /// `#elif`. `cond` is ignored when this frame can no longer take.
    pub fn handle_elif(&mut self, cond: bool, span: Span) -> Result<(), DirectiveError> {
        let frame = self.frames.last_mut().ok_or(DirectiveError::StrayElif)?;
        if frame.has_else {
            return Err(DirectiveError::ElifAfterElse);
        }
        frame.state = match frame.state {
            FrameState::Taking => FrameState::Done,
            FrameState::Done => FrameState::Done,
            FrameState::Skipping => {
                if cond {
                    FrameState::Taking
                } else {
                    FrameState::Skipping
                }
            }
        };
        let _ = span;
        Ok(())
    }

    /// `#else`.
    pub fn handle_else(&mut self, _span: Span) -> Result<(), DirectiveError> {
        let frame = self.frames.last_mut().ok_or(DirectiveError::StrayElse)?;
        if frame.has_else {
            return Err(DirectiveError::DuplicateElse);
        }
        frame.has_else = true;
        frame.state = match frame.state {
            FrameState::Taking => FrameState::Done,
            FrameState::Done => FrameState::Done,
            FrameState::Skipping => FrameState::Taking,
        };
        Ok(())
    }

    /// `#endif`.
    pub fn handle_endif(&mut self) -> Result<(), DirectiveError> {
        self.frames.pop().ok_or(DirectiveError::StrayEndif)?;
        Ok(())
    }

    /// Spans of any groups still open at end of input, for the
    /// "unterminated `#if`" diagnostic.
    pub fn unterminated_spans(&self) -> Vec<Span> {
        self.frames.iter().map(|f| f.opened_by_span).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppp_util::BufferId;

    fn span() -> Span {
        Span {
            buffer: BufferId(0),
            start: 0,
            len: 1,
        }
    }

    #[test]
    fn simple_if_true_is_active() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(true, span()).unwrap();
        assert!(stack.is_active());
        stack.handle_endif().unwrap();
        assert!(stack.is_active());
    }

    #[test]
    fn simple_if_false_is_inactive() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(false, span()).unwrap();
        assert!(!stack.is_active());
    }

    #[test]
    fn elif_after_false_if_can_take() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(false, span()).unwrap();
        stack.handle_elif(true, span()).unwrap();
        assert!(stack.is_active());
    }

    #[test]
    fn elif_after_taken_branch_is_skipped_regardless_of_condition() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(true, span()).unwrap();
        stack.handle_elif(true, span()).unwrap();
        assert!(!stack.is_active());
    }

    #[test]
    fn else_takes_only_if_nothing_taken_yet() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(false, span()).unwrap();
        stack.handle_elif(false, span()).unwrap();
        stack.handle_else(span()).unwrap();
        assert!(stack.is_active());
    }

    #[test]
    fn duplicate_else_is_an_error() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(true, span()).unwrap();
        stack.handle_else(span()).unwrap();
        assert_eq!(
            stack.handle_else(span()),
            Err(DirectiveError::DuplicateElse)
        );
    }

    #[test]
    fn elif_after_else_is_an_error() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(true, span()).unwrap();
        stack.handle_else(span()).unwrap();
        assert_eq!(
            stack.handle_elif(true, span()),
            Err(DirectiveError::ElifAfterElse)
        );
    }

    #[test]
    fn stray_else_elif_endif_are_errors_with_empty_stack() {
        let mut stack = ConditionalStack::new(64);
        assert_eq!(stack.handle_else(span()), Err(DirectiveError::StrayElse));
        assert_eq!(
            stack.handle_elif(true, span()),
            Err(DirectiveError::StrayElif)
        );
        assert_eq!(stack.handle_endif(), Err(DirectiveError::StrayEndif));
    }

    #[test]
    fn nested_if_inside_skipped_region_never_activates() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(false, span()).unwrap(); // outer skipping
        stack.push_if(true, span()).unwrap(); // inner: condition irrelevant
        assert!(!stack.is_active());
        stack.handle_else(span()).unwrap();
        assert!(!stack.is_active());
        stack.handle_endif().unwrap();
        assert!(!stack.is_active());
        stack.handle_endif().unwrap();
        assert!(stack.is_active());
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut stack = ConditionalStack::new(2);
        stack.push_if(true, span()).unwrap();
        stack.push_if(true, span()).unwrap();
        assert_eq!(
            stack.push_if(true, span()),
            Err(DirectiveError::ConditionalDepthExceeded)
        );
    }

    #[test]
    fn unterminated_groups_are_reported_at_end_of_input() {
        let mut stack = ConditionalStack::new(64);
        stack.push_if(true, span()).unwrap();
        stack.push_if(true, span()).unwrap();
        assert_eq!(stack.unterminated_spans().len(), 2);
    }
}
