//! Construction cycle detection.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

const MAX_DEPTH: usize = 256;

// Services currently under construction on this thread, outermost first.
thread_local! {
    static CONSTRUCTION_TLS: RefCell<ConstructionTls> = RefCell::new(ConstructionTls::default());
}

#[derive(Default)]
struct ConstructionTls {
    stack: Vec<Frame>,
}

struct Frame {
    container: u64,
    key: String,
}

/// Marks `key` as under construction until dropped.
pub(crate) struct StackGuard {
    container: u64,
}

impl StackGuard {
    /// Pushes a frame, or fails if `key` is already being built by the same
    /// container further up this thread's stack.
    pub(crate) fn enter(container: u64, key: &str) -> DiResult<Self> {
        CONSTRUCTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();

            if let Some(start) = tls
                .stack
                .iter()
                .position(|frame| frame.container == container && frame.key == key)
            {
                let mut path: Vec<String> = tls.stack[start..]
                    .iter()
                    .filter(|frame| frame.container == container)
                    .map(|frame| frame.key.clone())
                    .collect();
                path.push(key.to_string());
                return Err(DiError::Circular(path));
            }

            if tls.stack.len() >= MAX_DEPTH {
                return Err(DiError::DepthExceeded(tls.stack.len()));
            }

            tls.stack.push(Frame {
                container,
                key: key.to_string(),
            });
            Ok(Self { container })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        CONSTRUCTION_TLS.with(|tls| {
            if let Some(last) = tls.borrow_mut().stack.pop() {
                debug_assert_eq!(last.container, self.container);
            }
        });
    }
}

/// Runs `f` with `key` on the construction stack.
pub(crate) fn with_construction_guard<T, F>(container: u64, key: &str, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    let _guard = StackGuard::enter(container, key)?;
    f()
}
