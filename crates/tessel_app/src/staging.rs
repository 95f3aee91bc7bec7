//! Staging buffers
//!
//! Setters write here; the very next element or component call takes every
//! buffer at once. Anything still staged when a render procedure or content
//! closure returns had no call to attach to: it is reported and dropped.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tessel_dom::PropValue;

use crate::handle::{Handle, NodeRef};

/// How far a staged `no_preserve` reaches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NoPreserve {
    /// Only the instance of the next call
    Shallow,
    /// The next call and everything rendered inside it
    Deep,
}

#[derive(Default)]
pub(crate) struct Staging {
    refs: SmallVec<[NodeRef; 1]>,
    classes: Vec<String>,
    style: String,
    props: IndexMap<String, PropValue>,
    main: bool,
    no_preserve: Option<NoPreserve>,
}

/// The buffers taken by one call
#[derive(Default)]
pub(crate) struct Staged {
    pub refs: SmallVec<[NodeRef; 1]>,
    pub classes: Vec<String>,
    pub style: String,
    pub props: IndexMap<String, PropValue>,
    pub main: bool,
    pub no_preserve: Option<NoPreserve>,
}

impl Staged {
    /// Point every staged ref at the instance
    pub fn fulfill_refs(&self, handle: &Handle) {
        for target in &self.refs {
            target.set(handle.clone());
        }
    }

    pub fn has_presentation(&self) -> bool {
        !self.classes.is_empty() || !self.style.is_empty()
    }
}

impl Staging {
    pub fn push_ref(&mut self, target: &NodeRef) {
        self.refs.push(target.clone());
    }

    pub fn push_classes(&mut self, classes: &str) {
        self.classes
            .extend(classes.split_whitespace().map(str::to_owned));
    }

    pub fn push_style(&mut self, css: &str) {
        let css = css.trim();
        if css.is_empty() {
            return;
        }
        self.style.push_str(css);
        if !css.ends_with(';') {
            self.style.push(';');
        }
    }

    pub fn set_prop(&mut self, name: &str, value: PropValue) {
        self.props.insert(name.to_owned(), value);
    }

    pub fn set_main(&mut self) {
        self.main = true;
    }

    pub fn set_no_preserve(&mut self, depth: NoPreserve) {
        self.no_preserve = Some(depth);
    }

    /// Take every buffer, leaving them empty
    pub fn take(&mut self) -> Staged {
        Staged {
            refs: std::mem::take(&mut self.refs),
            classes: std::mem::take(&mut self.classes),
            style: std::mem::take(&mut self.style),
            props: std::mem::take(&mut self.props),
            main: std::mem::replace(&mut self.main, false),
            no_preserve: self.no_preserve.take(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
            && self.classes.is_empty()
            && self.style.is_empty()
            && self.props.is_empty()
            && !self.main
            && self.no_preserve.is_none()
    }

    /// Drop whatever no call consumed, warning about it when `diagnostics` is on
    pub fn clear_unconsumed(&mut self, diagnostics: bool, scope: &str) {
        if self.is_empty() {
            return;
        }
        let staged = self.take();
        if !diagnostics {
            return;
        }
        if !staged.refs.is_empty() {
            tracing::warn!(scope, count = staged.refs.len(), "ref is not fulfilled");
        }
        if !staged.classes.is_empty() {
            tracing::warn!(scope, classes = ?staged.classes, "classes are not consumed");
        }
        if !staged.style.is_empty() {
            tracing::warn!(scope, style = %staged.style, "style is not consumed");
        }
        if !staged.props.is_empty() {
            let names: Vec<&str> = staged.props.keys().map(String::as_str).collect();
            tracing::warn!(scope, props = ?names, "props are not consumed");
        }
        if staged.main {
            tracing::warn!(scope, "main() had no following call");
        }
        if let Some(depth) = staged.no_preserve {
            tracing::warn!(scope, ?depth, "no_preserve() had no following call");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_empties_every_buffer() {
        let mut staging = Staging::default();
        let target = NodeRef::new();
        staging.push_ref(&target);
        staging.push_classes(" a  b ");
        staging.push_style("color: red");
        staging.set_prop("title", "x".into());
        staging.set_main();
        staging.set_no_preserve(NoPreserve::Deep);
        assert!(!staging.is_empty());

        let staged = staging.take();
        assert!(staging.is_empty());
        assert_eq!(staged.classes, vec!["a", "b"]);
        assert_eq!(staged.style, "color: red;");
        assert!(staged.main);
        assert_eq!(staged.no_preserve, Some(NoPreserve::Deep));
        assert!(staged.has_presentation());
    }

    #[test]
    fn test_unconsumed_buffers_are_cleared() {
        let mut staging = Staging::default();
        staging.push_classes("orphan");
        staging.set_no_preserve(NoPreserve::Shallow);
        staging.clear_unconsumed(false, "test");
        assert!(staging.is_empty());
    }
}
