//! Composite tasks
//!
//! Composites never write operations for themselves (except
//! [`DefaultOutputs`]); they own their children as [`TaskNode`]s and decide
//! which of them are ticked. Children are ticked in declared order, so when
//! two active children write the same operation in one tick the later one
//! wins.
//!
//! A child that fails is already stopped and reverted by its own node. What
//! the failure means for the parent is documented per composite.

pub mod conditional;
pub mod defaults;
pub mod parallel;
pub mod retry;
pub mod sequence;
pub mod timeout;

pub use conditional::Conditional;
pub use defaults::DefaultOutputs;
pub use parallel::{CompletionPolicy, Parallel};
pub use retry::Retry;
pub use sequence::Sequence;
pub use timeout::Timeout;

use alloc::string::String;

use crate::error::TaskError;
use crate::task::TaskNode;

fn child_failed(child: &TaskNode) -> TaskError {
    TaskError::ChildFailed {
        child: String::from(child.name()),
    }
}
