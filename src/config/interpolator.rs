// Argument interpolators: balanced textual placeholders inside a modifier
// argument, e.g. `$(x)` (spec §3, glossary "Interpolator").

use crate::config::registry::Named;
use crate::config::ParseContext;
use std::rc::Rc;

pub struct ArgumentInterpolator {
    /// The opening literal, e.g. `"$("` or `"$"`. Doubles as the registry
    /// key, so longest-match applies here exactly as it does to modifier
    /// names (spec §4.4's design note: "Longest-match applies to
    /// interpolator openers as well").
    pub name: String,
    /// The closing literal terminating the balanced content, e.g. `")"`.
    /// Empty for interpolators with no explicit close (a bare `$name`
    /// token reads until the next non-identifier character instead).
    pub postfix: String,
    #[allow(clippy::type_complexity)]
    pub expand: Option<Rc<dyn Fn(&str, &mut ParseContext, bool) -> Option<String>>>,
}

impl ArgumentInterpolator {
    pub fn new(name: impl Into<String>, postfix: impl Into<String>) -> Self {
        Self { name: name.into(), postfix: postfix.into(), expand: None }
    }

    pub fn with_expand(
        mut self,
        expand: impl Fn(&str, &mut ParseContext, bool) -> Option<String> + 'static,
    ) -> Self {
        self.expand = Some(Rc::new(expand));
        self
    }
}

impl std::fmt::Debug for ArgumentInterpolator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentInterpolator")
            .field("name", &self.name)
            .field("postfix", &self.postfix)
            .field("has_expand", &self.expand.is_some())
            .finish()
    }
}

impl Named for ArgumentInterpolator {
    fn name(&self) -> &str {
        &self.name
    }
}
