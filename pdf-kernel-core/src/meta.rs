//! Scoped metadata attached to the current thread.
//!
//! Callers that drive the writer from deep inside their own logic can tag
//! the work with key/value pairs:
//!
//! ```rust
//! use pdf_kernel::meta::{self, MetaInfo};
//!
//! let info = MetaInfo::new().with("job", "invoice-42");
//! let seen = meta::with_meta_info(info, || meta::current());
//! assert_eq!(seen.unwrap().get("job"), Some("invoice-42"));
//! assert!(meta::current().is_none());
//! ```
//!
//! Scopes nest. Leaving a scope restores the previous one on every exit
//! path, including unwinding.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;

thread_local! {
    static STACK: RefCell<Vec<MetaInfo>> = const { RefCell::new(Vec::new()) };
}

/// Ordered string key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaInfo {
    entries: IndexMap<String, String>,
}

impl MetaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for MetaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Pops the scope it pushed, whichever way the scope is left.
struct ScopeGuard {
    depth: usize,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        STACK.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Runs `action` with `info` as the current metadata of this thread.
pub fn with_meta_info<T>(info: MetaInfo, action: impl FnOnce() -> T) -> T {
    let depth = STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.len();
        stack.push(info);
        depth
    });
    let _guard = ScopeGuard { depth };
    action()
}

/// Innermost active metadata of this thread.
pub fn current() -> Option<MetaInfo> {
    STACK.with(|stack| stack.borrow().last().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    fn job(name: &str) -> MetaInfo {
        MetaInfo::new().with("job", name)
    }

    #[test]
    fn test_nested_scopes_restore_previous() {
        assert!(current().is_none());
        with_meta_info(job("outer"), || {
            assert_eq!(current().unwrap().get("job"), Some("outer"));
            with_meta_info(job("inner"), || {
                assert_eq!(current().unwrap().get("job"), Some("inner"));
            });
            assert_eq!(current().unwrap().get("job"), Some("outer"));
        });
        assert!(current().is_none());
    }

    #[test]
    fn test_error_path_restores() {
        let result: Result<(), &str> = with_meta_info(job("fails"), || Err("boom"));
        assert!(result.is_err());
        assert!(current().is_none());
    }

    #[test]
    fn test_panic_restores() {
        with_meta_info(job("outer"), || {
            let caught = panic::catch_unwind(AssertUnwindSafe(|| {
                with_meta_info(job("panics"), || panic!("boom"));
            }));
            assert!(caught.is_err());
            assert_eq!(current().unwrap().get("job"), Some("outer"));
        });
    }

    #[test]
    fn test_other_threads_do_not_see_scope() {
        with_meta_info(job("main"), || {
            let seen = std::thread::spawn(current).join().unwrap();
            assert!(seen.is_none());
        });
    }

    #[test]
    fn test_display_keeps_insertion_order() {
        let info = MetaInfo::new().with("b", "2").with("a", "1");
        assert_eq!(info.to_string(), "b=2,a=1");
        assert!(MetaInfo::new().is_empty());
    }
}
