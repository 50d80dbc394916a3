//! Specifier resolution.
//!
//! Canonical paths are `/`-rooted strings such as
//! `/dist/contentScripts/index.module.js`. Specifiers are resolved against
//! the path of the module that requested them:
//!
//! ```text
//! "./b.js"   from /x/a.js    ->  /x/b.js
//! "../c.js"  from /x/y/a.js  ->  /x/c.js
//! "/d.js"    from anywhere   ->  /d.js
//! ""         from /x/a.js    ->  /x/a.js
//! ```

/// Maps bare specifiers (`react`) into the bundled modules directory.
#[derive(Debug, Clone, PartialEq)]
pub struct BareModules {
    pub dir: String,
    pub extension: String,
}

impl BareModules {
    pub fn new(dir: impl Into<String>, extension: impl Into<String>) -> Self {
        BareModules {
            dir: dir.into().trim_end_matches('/').to_string(),
            extension: extension.into(),
        }
    }

    fn is_bare(specifier: &str) -> bool {
        !(specifier.is_empty()
            || specifier.starts_with('.')
            || specifier.starts_with('/')
            || specifier.starts_with('~'))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathResolver {
    bare_modules: Option<BareModules>,
}

impl PathResolver {
    pub fn new() -> Self {
        PathResolver { bare_modules: None }
    }

    pub fn with_bare_modules(mut self, bare_modules: BareModules) -> Self {
        self.bare_modules = Some(bare_modules);
        self
    }

    pub fn bare_modules(&self) -> Option<&BareModules> {
        self.bare_modules.as_ref()
    }

    /// Resolve `specifier` against the canonical path of the requesting module.
    pub fn resolve(&self, parent: &str, specifier: &str) -> String {
        let joined = if specifier.is_empty() {
            parent.to_string()
        } else if specifier.starts_with('/') {
            specifier.to_string()
        } else {
            match &self.bare_modules {
                Some(bare) if BareModules::is_bare(specifier) => {
                    format!("{}/{}{}", bare.dir, specifier, bare.extension)
                }
                _ => format!("{}/{}", parent_dir(parent), specifier),
            }
        };
        normalize(&joined)
    }
}

/// Everything before the last `/` of `path`.
fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..i],
        None => "",
    }
}

/// Drop `.` segments and let each `..` delete itself and the segment before
/// it.
///
/// There is no root clamping: `/../x` loses its leading empty segment and
/// comes out as `x`. A `..` in the first segment removes the last segment
/// instead (a splice with a negative start index), and since the `..` is
/// still there afterwards it keeps eating the path until nothing is left.
pub fn normalize(path: &str) -> String {
    let mut fragments: Vec<&str> = path.split('/').collect();
    let mut i: isize = 0;
    while i < fragments.len() as isize {
        if i >= 0 {
            match fragments[i as usize] {
                "." => {
                    fragments.remove(i as usize);
                    i -= 1;
                }
                ".." => {
                    if i == 0 {
                        fragments.pop();
                    } else {
                        fragments.drain((i - 1) as usize..=i as usize);
                    }
                    i -= 2;
                }
                _ => {}
            }
        }
        i += 1;
    }
    fragments.join("/")
}
